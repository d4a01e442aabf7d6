use crate::compiler::compiler_errors::{
    CompileError, CompilerMessages, ErrorMetaDataKey, ErrorType,
};
use crate::compiler::compiler_warnings::print_formatted_warning;
use saying::say;
use std::env;
use std::path::{Path, PathBuf};

fn normalize_display_path(path: &Path) -> PathBuf {
    let path_string = path.to_string_lossy();
    if let Some(stripped) = path_string.strip_prefix(r"\\?\") {
        return PathBuf::from(stripped);
    }

    path.to_path_buf()
}

fn relative_display_path(file: &Path) -> String {
    let normalized_file = normalize_display_path(file);

    match env::current_dir() {
        Ok(dir) => {
            let normalized_dir = normalize_display_path(&dir);
            normalized_file
                .strip_prefix(&normalized_dir)
                .unwrap_or(&normalized_file)
                .to_string_lossy()
                .to_string()
        }
        Err(_) => normalized_file.to_string_lossy().to_string(),
    }
}

pub fn print_compiler_messages(messages: &CompilerMessages) {
    // Format and print out the messages:
    for err in &messages.errors {
        print_formatted_error(err);
    }

    for warning in &messages.warnings {
        print_formatted_warning(warning);
    }
}

pub fn print_formatted_error(e: &CompileError) {
    // The AST files have no line information in them,
    // so the most precise thing to point at is the file itself.
    let relative_dir = match &e.file {
        Some(file) => relative_display_path(file),
        None => String::new(),
    };

    match e.error_type {
        ErrorType::Syntax => {
            if !relative_dir.is_empty() {
                say!("\n(╯°□°)╯  🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥  Σ(°△°;) ");
            }

            say!(Red "Syntax");
        }

        ErrorType::Type => {
            if !relative_dir.is_empty() {
                say!("\n(ಠ_ಠ) ", Dark Magenta relative_dir);
                say!(Inline " ( ._. ) ");
            }

            say!(Red "Type Error");
        }

        ErrorType::Rule => {
            if !relative_dir.is_empty() {
                say!("\nヽ(˶°o°)ﾉ  🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥  ╰(°□°╰) ");
            }

            say!(Red "Rule");
        }

        ErrorType::File => {
            say!(Yellow "🏚 Can't find/read file or directory: ", relative_dir);
            say!(Red { &e.msg });
            return;
        }

        ErrorType::Config => {
            if !relative_dir.is_empty() {
                say!("\n (-_-)  🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥  <(^~^)/ ");
            }
            say!(Yellow "CONFIG FILE ISSUE - ");
            say!(Dark Yellow "Something in the project config doesn't make sense");
        }

        ErrorType::Compiler => {
            if !relative_dir.is_empty() {
                say!("\nヽ༼☉ ‿ ⚆༽ﾉ  🔥🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥🔥  ╰(° _ o╰) ");
            }
            say!(Yellow "COMPILER BUG - ");
            say!(Dark Yellow "sapling developer skill issue (not your fault)");
        }

        ErrorType::WasmGeneration => {
            if !relative_dir.is_empty() {
                say!("\nヽ༼☉ ‿ ⚆༽ﾉ  🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥  ╰(° O °)╯ ");
            }
            say!(Yellow "WASM GENERATION BUG - ");
            say!(Dark Yellow "the backend produced a module the validator rejects (not your fault)");
        }
    }

    say!(Red { &e.msg });

    if let Some(suggestion) = e.metadata.get(&ErrorMetaDataKey::PrimarySuggestion) {
        say!(Dark Cyan "Hint: ", { suggestion });
    }
}
