//! Command-line entrypoints for the sapling compiler.
//!
//! This module parses CLI commands and dispatches them into the build and
//! check workflows.

use crate::build::{self, Flag};
use crate::compiler::compiler_warnings::print_formatted_warning;
use crate::compiler::display_messages::{print_compiler_messages, print_formatted_error};
use saying::say;
use std::env;
use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Build(PathBuf), // Compiles a file, or every file in a directory
    Check(PathBuf), // Type checks only, writes nothing

    Help,
}

pub fn start_cli() {
    let compiler_args: Vec<String> = env::args().collect();

    if compiler_args.len() < 2 {
        print_help(true);
        return;
    }

    let command = match get_command(&compiler_args[1..]) {
        Ok(command) => command,
        Err(e) => {
            say!(e);
            print_help(true);
            return;
        }
    };

    // Gather a list of any additional flags
    let flags = get_flags(&compiler_args);

    match command {
        Command::Help => {
            print_help(false);
        }

        Command::Build(path) => match build::build_project(&path, &flags) {
            Ok(project) => {
                if !flags.contains(&Flag::DisableWarnings) {
                    for warning in &project.warnings {
                        print_formatted_warning(warning);
                    }
                }

                match build::write_project_files(&project) {
                    Ok(_) => {}
                    Err(e) => print_formatted_error(&e),
                }
            }
            Err(mut messages) => {
                if flags.contains(&Flag::DisableWarnings) {
                    messages.warnings.clear();
                }
                print_compiler_messages(&messages);
            }
        },

        Command::Check(path) => {
            let mut messages = build::check_project(&path);
            if flags.contains(&Flag::DisableWarnings) {
                messages.warnings.clear();
            }

            let clean = !messages.has_errors();
            print_compiler_messages(&messages);

            if clean {
                say!(Green Bold "No problems found");
            }
        }
    }
}

fn get_command(args: &[String]) -> Result<Command, String> {
    let command = args.first().map(String::as_str);

    match command {
        Some("help") => Ok(Command::Help),

        Some("build") => match args.get(1) {
            Some(path) if !path.starts_with("--") => Ok(Command::Build(PathBuf::from(path))),

            // No path means build whatever directory the user is inside
            _ => Ok(Command::Build(current_dir()?)),
        },

        Some("check") => match args.get(1) {
            Some(path) if !path.starts_with("--") => Ok(Command::Check(PathBuf::from(path))),
            _ => Ok(Command::Check(current_dir()?)),
        },

        _ => Err(format!("Invalid command: '{}'", command.unwrap_or(""))),
    }
}

fn current_dir() -> Result<PathBuf, String> {
    env::current_dir().map_err(|e| format!("Error getting current directory: {e}"))
}

fn get_flags(args: &[String]) -> Vec<Flag> {
    let mut flags = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--release" => flags.push(Flag::Release),
            "--wat" => flags.push(Flag::Wat),
            "--hide-warnings" => flags.push(Flag::DisableWarnings),
            "--hide-timers" => flags.push(Flag::DisableTimers),
            _ => {}
        }
    }

    flags
}

fn print_help(commands_only: bool) {
    if !commands_only {
        say!(Bright Black "------------------------------------");
        say!(Green Bold "The sapling compiler");
        say!("Usage: ", Bold "<command>", Italic " <args>");
    }
    say!(Green Bold "\nCommands:");
    say!("  build <path>      - Compiles an .ast file, or every .ast file in a directory");
    say!("  check <path>      - Type checks without writing any output");
    say!("  help              - Shows this message");

    say!(Green Bold "\nFlags:");
    say!("  --wat             - Also writes the text format next to each .wasm file");
    say!("  --release         - Writes output into the release folder");
    say!("  --hide-warnings");
    say!("  --hide-timers");
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
