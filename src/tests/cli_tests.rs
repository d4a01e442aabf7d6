//! Tests for CLI command parsing and flag extraction.

use super::{Command, get_command, get_flags};
use crate::build::Flag;
use std::path::PathBuf;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn build_command_takes_a_path() {
    let command = get_command(&args(&["build", "main.ast"])).expect("command should parse");
    assert_eq!(command, Command::Build(PathBuf::from("main.ast")));
}

#[test]
fn build_command_without_path_uses_the_current_directory() {
    let command = get_command(&args(&["build"])).expect("command should parse");
    let expected = std::env::current_dir().expect("current dir should resolve");
    assert_eq!(command, Command::Build(expected));
}

#[test]
fn build_command_does_not_mistake_a_flag_for_a_path() {
    let command = get_command(&args(&["build", "--wat"])).expect("command should parse");
    let expected = std::env::current_dir().expect("current dir should resolve");
    assert_eq!(command, Command::Build(expected));
}

#[test]
fn check_command_takes_a_path() {
    let command = get_command(&args(&["check", "programs"])).expect("command should parse");
    assert_eq!(command, Command::Check(PathBuf::from("programs")));
}

#[test]
fn help_command_parses() {
    let command = get_command(&args(&["help"])).expect("command should parse");
    assert_eq!(command, Command::Help);
}

#[test]
fn invalid_command_reports_the_name() {
    let error = get_command(&args(&["frobnicate"])).expect_err("unknown command should fail");
    assert!(error.contains("frobnicate"));
}

#[test]
fn flags_parse_from_anywhere_in_the_args() {
    let flags = get_flags(&args(&["sap", "build", "main.ast", "--wat", "--hide-timers"]));
    assert!(flags.contains(&Flag::Wat));
    assert!(flags.contains(&Flag::DisableTimers));
    assert!(!flags.contains(&Flag::Release));
    assert!(!flags.contains(&Flag::DisableWarnings));
}

#[test]
fn unknown_flags_are_ignored() {
    let flags = get_flags(&args(&["sap", "build", "--frobnicate"]));
    assert!(flags.is_empty());
}
