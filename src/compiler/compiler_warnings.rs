use saying::say;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct CompilerWarning {
    pub msg: String,
    pub warning_kind: WarningKind,
    pub file: Option<PathBuf>,
}

impl CompilerWarning {
    pub fn new(msg: impl Into<String>, warning_kind: WarningKind) -> CompilerWarning {
        CompilerWarning {
            msg: msg.into(),
            warning_kind,
            file: None,
        }
    }

    pub fn with_file(mut self, file: &Path) -> Self {
        self.file = Some(file.to_path_buf());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum WarningKind {
    UnusedVariable,
    ConstantCondition,
}

pub fn print_formatted_warning(w: &CompilerWarning) {
    match &w.file {
        Some(file) => say!(Yellow "Warning ", Dark Magenta { file.display() }),
        None => say!(Yellow "Warning"),
    }

    match w.warning_kind {
        WarningKind::UnusedVariable => {
            say!("Unused variable '", Bright { &w.msg }, "'. Assigned but never read.");
        }
        WarningKind::ConstantCondition => {
            say!({ &w.msg });
        }
    }
}
