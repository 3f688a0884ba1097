//! Interactive text editing, supplied by the caller.

use std::error::Error;

/// Lets the user edit a block of text, e.g. in `$EDITOR`.
pub trait NotesEditor {
    type Error: Error + Send + Sync + 'static;

    /// Returns the edited text for `current`.
    fn edit(&self, current: &str) -> Result<String, Self::Error>;
}
