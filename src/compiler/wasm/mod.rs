pub mod encode;
pub mod instructions;
pub mod module;
pub mod validate;
pub mod wat;
