//! Launching an external editor on a task file

use std::path::Path;
use std::process::Command;

use crate::error::{DexError, Result};

/// Fallback when neither the config nor `$EDITOR` names an editor.
pub const FALLBACK_EDITOR: &str = "vim";

/// Something that lets the user edit a file in place.
///
/// The core only hands over a path and waits; what happens in between is opaque.
pub trait Editor {
    fn open(&self, path: &Path) -> Result<()>;
}

/// Runs an editor program with the file path as its only argument
#[derive(Debug, Clone)]
pub struct CommandEditor {
    program: String,
}

impl CommandEditor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Explicit override, then `$EDITOR`, then [`FALLBACK_EDITOR`].
    pub fn resolve(configured: Option<&str>) -> Self {
        let program = configured
            .filter(|p| !p.trim().is_empty())
            .map(str::to_string)
            .or_else(|| std::env::var("EDITOR").ok().filter(|p| !p.trim().is_empty()))
            .unwrap_or_else(|| FALLBACK_EDITOR.to_string());
        Self::new(program)
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Editor for CommandEditor {
    fn open(&self, path: &Path) -> Result<()> {
        // $EDITOR may carry arguments, e.g. "code --wait"
        let mut parts = self.program.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| DexError::validation("editor", "editor command is empty"))?;

        let status = Command::new(program).args(parts).arg(path).status()?;
        if !status.success() {
            tracing::warn!(editor = %self.program, %status, "editor exited unsuccessfully");
        }
        Ok(())
    }
}
