use crate::compiler::compiler_errors::CompileError;
use crate::return_config_error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const AST_FILE_EXTENSION: &str = "ast";
pub const WASM_FILE_EXTENSION: &str = "wasm";
pub const WAT_FILE_EXTENSION: &str = "wat";
pub const CONFIG_FILE_NAME: &str = "sapling.toml";
pub const ENTRY_FUNC_NAME: &str = "main";
pub const HOST_MODULE_NAME: &str = "env";
pub const HOST_MEMORY_NAME: &str = "memory";

// This is a guess about how much should be initially allocated for instruction vecs.
// Just a heuristic based on the sample programs in the course test suite,
// not measured carefully. Should be recalculated at a later point.
pub const STMT_TO_INSTR_RATIO: usize = 6; // (Maybe) Straight-line statements lower to ~4-8 instructions

// One page is 64KiB. The runtime never actually touches memory in either
// language variant, but the import has to be declared for the harness to link.
pub const DEFAULT_MAX_MEM_PAGES: u64 = 16;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project_name: String,
    pub dev_folder: PathBuf,
    pub release_folder: PathBuf,

    // Minimum size of the imported linear memory, in 64KiB pages
    pub max_mem_pages: u64,

    pub version: String,
    pub author: String,
    pub license: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            project_name: String::from("sapling_project"),
            dev_folder: PathBuf::from("dev"),
            release_folder: PathBuf::from("release"),
            max_mem_pages: DEFAULT_MAX_MEM_PAGES,
            version: String::from("0.1.0"),
            author: String::new(),
            license: String::from("MIT"),
        }
    }
}

impl Config {
    /// Reads the project config from a sapling.toml in the given directory.
    /// No config file at all is fine (everything has a default),
    /// a config file that doesn't parse is not.
    pub fn load(project_dir: &Path) -> Result<Config, CompileError> {
        let path = project_dir.join(CONFIG_FILE_NAME);

        if !path.exists() {
            return Ok(Config::default());
        }

        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                return Err(CompileError::file_error(
                    &path,
                    format!("Can't read {CONFIG_FILE_NAME}: {e}"),
                ));
            }
        };

        match toml::from_str::<Config>(&source) {
            Ok(config) => {
                if config.max_mem_pages == 0 {
                    return_config_error!(
                        "max_mem_pages must be at least 1 (one 64KiB page)",
                        { PrimarySuggestion => "Remove max_mem_pages to get the default" }
                    );
                }
                Ok(config)
            }
            Err(e) => Err(CompileError::config_error(format!(
                "{CONFIG_FILE_NAME} is not valid: {e}"
            ))
            .with_file(&path)),
        }
    }
}
