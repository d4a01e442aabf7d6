use crate::compiler::compiler_errors::CompileError;
use crate::compiler::{lang_loop, lang_var};
use crate::return_syntax_error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One deserialized `.ast` document.
///
/// The course frontend parses source text and serializes the typed tree as
/// JSON with a `language` tag naming the variant, so this compiler never
/// sees source code at all. The tag decides which pipeline the document
/// goes down; the two never mix.
#[derive(Debug, Deserialize)]
#[serde(tag = "language", rename_all = "lowercase")]
pub enum AstDocument {
    Var(lang_var::ast::Module),
    Loop(lang_loop::ast::Module),
}

pub fn load_ast_file(path: &Path) -> Result<AstDocument, CompileError> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            return Err(CompileError::file_error(
                path,
                format!("Can't read AST file: {e}"),
            ));
        }
    };

    parse_ast_str(&source)
}

/// Deserializes one AST document from JSON text.
///
/// A failure here means the frontend handed over something that isn't a
/// valid program in the language it claims, so the serde message goes
/// straight into the error.
pub fn parse_ast_str(source: &str) -> Result<AstDocument, CompileError> {
    match serde_json::from_str::<AstDocument>(source) {
        Ok(document) => Ok(document),
        Err(e) => return_syntax_error!(
            format!("Malformed AST document: {e}"),
            {
                CompilationStage => "Loading",
                PrimarySuggestion => "Re-export the AST from the frontend",
            }
        ),
    }
}
