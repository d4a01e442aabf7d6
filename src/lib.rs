pub mod build;
pub mod cli;
pub mod compiler;
pub mod settings;

mod compiler_tests;
