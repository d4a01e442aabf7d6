use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// All the errors and warnings collected while building a project.
/// The CLI drains this at the end of a build and pretty prints everything.
#[derive(Debug, Default)]
pub struct CompilerMessages {
    pub errors: Vec<CompileError>,
    pub warnings: Vec<crate::compiler::compiler_warnings::CompilerWarning>,
}

impl CompilerMessages {
    pub fn new() -> Self {
        CompilerMessages {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ErrorMetaDataKey {
    VariableName,
    FunctionName,
    CompilationStage,

    // Optional suggestions
    // Can be expanded to add more later
    PrimarySuggestion,     // One-line fix or top-level idea
    AlternativeSuggestion, // Secondary alternative

    // Data type information
    ExpectedType,
    FoundType,
}

/// One error from any stage of the pipeline.
///
/// AST documents arrive from the course frontend without source spans
/// (they get stripped during serialization), so an error points at a file
/// rather than a line. The build driver fills in the file path before
/// anything is displayed.
#[derive(Clone, Debug, PartialEq)]
pub struct CompileError {
    pub msg: String,
    pub file: Option<PathBuf>,
    pub error_type: ErrorType,

    // This is for creating more structured and detailed error messages
    // Optimized for LLMs to understand exactly what went wrong
    pub metadata: HashMap<ErrorMetaDataKey, &'static str>,
}

impl CompileError {
    pub fn new(msg: impl Into<String>, error_type: ErrorType) -> CompileError {
        CompileError {
            msg: msg.into(),
            file: None,
            error_type,
            metadata: HashMap::new(),
        }
    }

    pub fn with_file(mut self, file: &Path) -> Self {
        self.file = Some(file.to_path_buf());
        self
    }

    pub fn new_metadata_entry(&mut self, key: ErrorMetaDataKey, value: &'static str) {
        self.metadata.insert(key, value);
    }

    /// Create a new syntax error with a clear explanation
    pub fn new_syntax_error(msg: impl Into<String>) -> Self {
        CompileError::new(msg, ErrorType::Syntax)
    }

    /// Create a new rule error with a descriptive message (no metadata)
    pub fn new_rule_error(msg: impl Into<String>) -> Self {
        CompileError::new(msg, ErrorType::Rule)
    }

    /// Create a new type error with type information and suggestions
    pub fn new_type_error(msg: impl Into<String>) -> Self {
        CompileError::new(msg, ErrorType::Type)
    }

    /// Create a compiler error (internal bug, not user's fault)
    pub fn compiler_error(msg: impl Into<String>) -> Self {
        CompileError::new(msg, ErrorType::Compiler)
    }

    /// Create a file system error from a Path
    pub fn file_error(path: &Path, msg: impl Into<String>) -> Self {
        CompileError::new(msg, ErrorType::File).with_file(path)
    }

    /// Create a config error (something in the project TOML doesn't make sense)
    pub fn config_error(msg: impl Into<String>) -> Self {
        CompileError::new(msg, ErrorType::Config)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ErrorType {
    Syntax,
    Type,
    Rule,
    File,
    Config,
    Compiler,
    WasmGeneration,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::Compiler => "Compiler Bug",
        ErrorType::Syntax => "Syntax Error",
        ErrorType::Config => "Malformed Config",
        ErrorType::File => "File Error",
        ErrorType::Rule => "Language Rule Violation",
        ErrorType::Type => "Type Error",
        ErrorType::WasmGeneration => "WASM Generation",
    }
}

/// Returns a new CompileError for malformed AST documents.
///
/// Syntax errors here mean the JSON the frontend handed over doesn't
/// deserialize into the language it claims to be. These should include
/// the serde message so the frontend developer can see what's wrong.
///
/// Usage:
/// `return_syntax_error!("message", {
///     CompilationStage => "Loading",
///     PrimarySuggestion => "Re-export the AST from the frontend",
/// })`;
#[macro_export]
macro_rules! return_syntax_error {
    ($msg:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::Syntax,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $(
                    map.insert($crate::compiler::compiler_errors::ErrorMetaDataKey::$key, $value);
                )*
                map
            },
        })
    };
    ($msg:expr) => {
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::Syntax,
            metadata: std::collections::HashMap::new(),
        })
    };
}

/// Returns a new CompileError for type system violations.
///
/// Type errors indicate mismatched types or invalid type operations.
/// Should mention both expected and actual types with suggestions.
///
/// Usage:
/// `return_type_error!("Cannot add x and y", { ExpectedType => "Int", FoundType => "Bool" })`;
#[macro_export]
macro_rules! return_type_error {
    // With metadata
    ($msg:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::Type,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    // Simple
    ($msg:expr) => {
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::Type,
            metadata: std::collections::HashMap::new(),
        })
    };
}

/// Returns a new CompileError for semantic rule violations.
///
/// Rule errors indicate violations of language semantics like undefined
/// variables or calls to functions that don't exist. Include specific names
/// and helpful suggestions when possible.
///
/// Usage:
/// `return_rule_error!("Undefined variable 'x'", { PrimarySuggestion => "Assign to it first" })`;
#[macro_export]
macro_rules! return_rule_error {
    // With metadata map
    ($msg:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::Rule,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    // Simple arm without metadata
    ($msg:expr) => {
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::Rule,
            metadata: std::collections::HashMap::new(),
        })
    };
}

/// Returns a new CompileError
///
/// Usage: `return_file_error!(path, "message")`;
#[macro_export]
macro_rules! return_file_error {
    ($path:expr, $msg:expr) => {{
        return Err($crate::compiler::compiler_errors::CompileError::file_error(
            $path, $msg,
        ));
    }};
}

/// Returns a new CompileError
///
/// Usage: `return_config_error!("message")`;
#[macro_export]
macro_rules! return_config_error {
    ($msg:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::Config,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    ($msg:expr) => {
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::Config,
            metadata: std::collections::HashMap::new(),
        })
    };
}

/// Returns a new CompileError for internal compiler bugs.
///
/// Compiler errors indicate bugs in the compiler itself, not user code issues.
#[macro_export]
macro_rules! return_compiler_error {
    // Variant with format string and arguments
    ($fmt:expr, $($arg:expr),+ $(,)?) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: format!($fmt, $($arg),+),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::Compiler,
            metadata: std::collections::HashMap::new(),
        });
    }};
    // Simple message variant
    ($msg:expr) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::Compiler,
            metadata: std::collections::HashMap::new(),
        });
    }};
}

/// Returns a new CompileError for failures in the WASM backend.
///
/// These are compiler bugs too (the checkers should have rejected anything
/// that can't be encoded), but they get their own type so a validator
/// failure is easy to tell apart from a lowering bug.
#[macro_export]
macro_rules! return_wasm_generation_error {
    ($fmt:expr, $($arg:expr),+ $(,)?) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: format!($fmt, $($arg),+),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::WasmGeneration,
            metadata: std::collections::HashMap::new(),
        });
    }};
    ($msg:expr) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            file: None,
            error_type: $crate::compiler::compiler_errors::ErrorType::WasmGeneration,
            metadata: std::collections::HashMap::new(),
        });
    }};
}
