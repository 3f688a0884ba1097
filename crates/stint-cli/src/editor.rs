//! Notes editing through an external editor.

use std::io::{self, Write};
use std::process::Command;

use stint_core::NotesEditor;

/// Runs an editor command on a temporary file holding the current notes.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    /// `command` may carry arguments, e.g. `code --wait`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl NotesEditor for ExternalEditor {
    type Error = io::Error;

    fn edit(&self, current: &str) -> io::Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("stint-notes-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(current.as_bytes())?;
        file.flush()?;

        let mut words = self.command.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "editor command is empty"))?;
        tracing::debug!(program, path = %file.path().display(), "launching editor");
        let status = Command::new(program)
            .args(words)
            .arg(file.path())
            .status()?;
        if !status.success() {
            return Err(io::Error::other(format!("{program} exited with {status}")));
        }

        std::fs::read_to_string(file.path())
    }
}
