pub mod ast_loader;
pub mod compiler_dev_logging;
pub mod compiler_errors;
pub mod compiler_warnings;
pub mod display_messages;
pub mod host_functions;

pub mod lang_loop;
pub mod lang_var;

pub mod wasm;
