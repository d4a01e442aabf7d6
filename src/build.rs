use crate::compiler::ast_loader::{self, AstDocument};
use crate::compiler::compiler_errors::{CompileError, CompilerMessages};
use crate::compiler::compiler_warnings::CompilerWarning;
use crate::compiler::wasm::{encode, validate, wat};
use crate::compiler::{lang_loop, lang_var};
use crate::settings::{AST_FILE_EXTENSION, Config, WASM_FILE_EXTENSION, WAT_FILE_EXTENSION};
use crate::{ast_log, codegen_log, return_compiler_error, return_file_error, timer_log};
use rayon::prelude::*;
use saying::say;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Flags change the behavior of the core build pipeline.
/// For the built-in CLI these are added as cli flags, but other callers
/// can choose flags however they like
#[derive(PartialEq, Debug, Clone)]
pub enum Flag {
    Release, // Dev mode is default
    Wat,     // Also write the text format next to each binary
    DisableWarnings,
    DisableTimers,
}

#[derive(Debug)]
pub struct OutputFile {
    pub full_file_path: PathBuf,
    file_kind: FileKind,
}

#[derive(Debug)]
pub enum FileKind {
    Wasm(Vec<u8>),
    Wat(String),
}

impl OutputFile {
    pub fn new(full_file_path: PathBuf, file_kind: FileKind) -> Self {
        Self {
            full_file_path,
            file_kind,
        }
    }

    pub fn file_kind(&self) -> &FileKind {
        &self.file_kind
    }
}

#[derive(Debug)]
pub struct Project {
    pub output_files: Vec<OutputFile>,
    pub warnings: Vec<CompilerWarning>,
}

/// Everything one AST document compiled into
struct FileBuild {
    output_files: Vec<OutputFile>,
    warnings: Vec<CompilerWarning>,
}

/// Builds a single `.ast` file or every `.ast` file in a directory.
///
/// Files compile in parallel and completely independently of each other.
/// There is no linking step: each document becomes its own module with its
/// own host imports. Results are aggregated back in input order, so errors
/// and output files always come out deterministic regardless of how the
/// parallel builds interleave.
///
/// Nothing is written to disk here. The caller decides what happens to the
/// output files (the CLI hands them straight to [`write_project_files`]).
pub fn build_project(entry_path: &Path, flags: &[Flag]) -> Result<Project, CompilerMessages> {
    let start = Instant::now();
    let mut messages = CompilerMessages::new();

    let (project_dir, files) = match collect_input_files(entry_path) {
        Ok(input) => input,
        Err(e) => {
            messages.errors.push(e);
            return Err(messages);
        }
    };

    let config = match Config::load(&project_dir) {
        Ok(config) => config,
        Err(e) => {
            messages.errors.push(e);
            return Err(messages);
        }
    };

    let output_dir = if flags.contains(&Flag::Release) {
        project_dir.join(&config.release_folder)
    } else {
        project_dir.join(&config.dev_folder)
    };

    let results: Vec<Result<FileBuild, CompileError>> = files
        .par_iter()
        .map(|path| compile_ast_file(path, &config, flags, &output_dir))
        .collect();

    let mut output_files = Vec::new();
    let mut warnings = Vec::new();
    for result in results {
        match result {
            Ok(build) => {
                output_files.extend(build.output_files);
                warnings.extend(build.warnings);
            }
            Err(e) => messages.errors.push(e),
        }
    }

    if messages.has_errors() {
        messages.warnings = warnings;
        return Err(messages);
    }

    if !flags.contains(&Flag::DisableTimers) {
        let duration = start.elapsed();
        say!(
            "\nBuilt ",
            Blue output_files.len(),
            Reset " files successfully in: ",
            Green Bold #duration
        );
    }

    Ok(Project {
        output_files,
        warnings,
    })
}

/// Runs the frontend only: load every document and type check it.
/// Nothing is lowered or encoded, so this is what editors and CI hooks
/// want for a fast "is this program valid" answer.
pub fn check_project(entry_path: &Path) -> CompilerMessages {
    let mut messages = CompilerMessages::new();

    let (project_dir, files) = match collect_input_files(entry_path) {
        Ok(input) => input,
        Err(e) => {
            messages.errors.push(e);
            return messages;
        }
    };

    // Config problems should surface from `check` too, even though
    // checking itself never reads it
    if let Err(e) = Config::load(&project_dir) {
        messages.errors.push(e);
        return messages;
    }

    let results: Vec<Result<Vec<CompilerWarning>, CompileError>> =
        files.par_iter().map(|path| check_ast_file(path)).collect();

    for result in results {
        match result {
            Ok(warnings) => messages.warnings.extend(warnings),
            Err(e) => messages.errors.push(e),
        }
    }

    messages
}

/// Writes every output file of a successful build, creating the output
/// directory if needed. Returns the paths that were written.
pub fn write_project_files(project: &Project) -> Result<Vec<PathBuf>, CompileError> {
    let mut written = Vec::with_capacity(project.output_files.len());

    for output_file in &project.output_files {
        // A safety check to make sure the file name has been set.
        // This is to avoid accidentally overwriting things by mistake
        if output_file.full_file_path == PathBuf::new() {
            return_compiler_error!("Output file did not have a name or path set");
        }

        if let Some(parent) = output_file.full_file_path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            return_file_error!(parent, format!("Can't create the output directory: {e}"));
        }

        let result = match output_file.file_kind() {
            FileKind::Wasm(bytes) => fs::write(&output_file.full_file_path, bytes),
            FileKind::Wat(text) => fs::write(&output_file.full_file_path, text),
        };

        if let Err(e) = result {
            return_file_error!(
                &output_file.full_file_path,
                format!("Error writing file: {e}")
            );
        }

        written.push(output_file.full_file_path.clone());
    }

    Ok(written)
}

/// The whole pipeline for one document:
/// load, check, lower, encode, validate.
fn compile_ast_file(
    path: &Path,
    config: &Config,
    flags: &[Flag],
    output_dir: &Path,
) -> Result<FileBuild, CompileError> {
    let time = Instant::now();
    let document = ast_loader::load_ast_file(path)?;
    ast_log!("Loaded AST document: ", #document);
    timer_log!(time, "AST loaded in: ");

    let time = Instant::now();
    let mut warnings = Vec::new();
    let wasm_module = match &document {
        AstDocument::Var(module) => lang_var::compile::compile_module(module, config, &mut warnings),
        AstDocument::Loop(module) => {
            lang_loop::compile::compile_module(module, config, &mut warnings)
        }
    }
    .map_err(|e| e.with_file(path))?;
    timer_log!(time, "Checked and lowered in: ");

    let time = Instant::now();
    let wasm_bytes = encode::encode_module(&wasm_module).map_err(|e| e.with_file(path))?;

    // Every module this compiler produces gets validated before anything
    // is allowed to see it. A failure here is a bug in lowering or
    // encoding, never in the user's program
    validate::validate_module(&wasm_bytes).map_err(|e| e.with_file(path))?;
    timer_log!(time, "Encoded and validated in: ");
    codegen_log!("\n", wat::render_module(&wasm_module));

    let warnings = warnings.into_iter().map(|w| w.with_file(path)).collect();

    let Some(stem) = path.file_stem() else {
        return_file_error!(path, "Input file has no name");
    };
    let out_base = output_dir.join(stem);

    let mut output_files = vec![OutputFile::new(
        out_base.with_extension(WASM_FILE_EXTENSION),
        FileKind::Wasm(wasm_bytes),
    )];

    if flags.contains(&Flag::Wat) {
        output_files.push(OutputFile::new(
            out_base.with_extension(WAT_FILE_EXTENSION),
            FileKind::Wat(wat::render_module(&wasm_module)),
        ));
    }

    Ok(FileBuild {
        output_files,
        warnings,
    })
}

fn check_ast_file(path: &Path) -> Result<Vec<CompilerWarning>, CompileError> {
    let document = ast_loader::load_ast_file(path)?;

    let mut warnings = Vec::new();
    match &document {
        AstDocument::Var(module) => {
            lang_var::tychecker::check_module(module, &mut warnings).map_err(|e| e.with_file(path))?;
        }
        AstDocument::Loop(module) => {
            lang_loop::tychecker::check_module(module, &mut warnings)
                .map_err(|e| e.with_file(path))?;
        }
    }

    Ok(warnings.into_iter().map(|w| w.with_file(path)).collect())
}

/// Resolves the entry path into the project directory (where the config
/// lives) and the list of documents to build, sorted by name so build
/// order never depends on directory iteration order.
fn collect_input_files(entry_path: &Path) -> Result<(PathBuf, Vec<PathBuf>), CompileError> {
    if entry_path.is_file() {
        if entry_path.extension().and_then(OsStr::to_str) != Some(AST_FILE_EXTENSION) {
            return_file_error!(
                entry_path,
                format!("Expected a .{AST_FILE_EXTENSION} file")
            );
        }

        let project_dir = match entry_path.parent() {
            Some(parent) if parent != Path::new("") => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        return Ok((project_dir, vec![entry_path.to_path_buf()]));
    }

    if entry_path.is_dir() {
        let entries = match fs::read_dir(entry_path) {
            Ok(entries) => entries,
            Err(e) => return_file_error!(entry_path, format!("Can't read directory: {e}")),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    return_file_error!(entry_path, format!("Can't read directory entry: {e}"))
                }
            };

            let path = entry.path();
            if path.is_file() && path.extension().and_then(OsStr::to_str) == Some(AST_FILE_EXTENSION)
            {
                files.push(path);
            }
        }

        if files.is_empty() {
            return_file_error!(
                entry_path,
                format!("No .{AST_FILE_EXTENSION} files in this directory")
            );
        }

        files.sort();
        return Ok((entry_path.to_path_buf(), files));
    }

    return_file_error!(entry_path, "Path does not exist")
}
