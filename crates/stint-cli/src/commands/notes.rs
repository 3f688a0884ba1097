//! Notes command: edit an entry's notes in an external editor.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use stint_core::{EntryStore, NotesEditor, Tracker};

use super::IdArgs;

pub fn run<W: Write, S: EntryStore, E: NotesEditor>(
    writer: &mut W,
    tracker: &mut Tracker<S>,
    editor: &E,
    args: &IdArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let entry = tracker.edit_notes(&args.alias, editor, now)?;
    if entry.notes.is_some() {
        writeln!(writer, "Updated notes for {}.", entry.alias)?;
    } else {
        writeln!(writer, "Cleared notes for {}.", entry.alias)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    use crate::commands::testing::{at, output, start, tracker};

    struct Scripted(&'static str);

    impl NotesEditor for Scripted {
        type Error = io::Error;

        fn edit(&self, _current: &str) -> io::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl NotesEditor for Broken {
        type Error = io::Error;

        fn edit(&self, _current: &str) -> io::Result<String> {
            Err(io::Error::other("editor crashed"))
        }
    }

    #[test]
    fn notes_are_saved_and_cleared() {
        let mut tracker = tracker();
        let alias = start(&mut tracker, "review");
        let args = IdArgs {
            alias: alias.clone(),
        };

        let mut buffer = Vec::new();
        run(&mut buffer, &mut tracker, &Scripted("ticket 42\n"), &args, at(9, 5)).unwrap();
        run(&mut buffer, &mut tracker, &Scripted("\n"), &args, at(9, 6)).unwrap();
        assert_eq!(
            output(buffer),
            format!("Updated notes for {alias}.\nCleared notes for {alias}.\n")
        );
    }

    #[test]
    fn editor_failure_leaves_notes_alone() {
        let mut tracker = tracker();
        let alias = start(&mut tracker, "review");
        let args = IdArgs {
            alias: alias.clone(),
        };
        run(&mut Vec::new(), &mut tracker, &Scripted("keep"), &args, at(9, 5)).unwrap();

        let err = run(&mut Vec::new(), &mut tracker, &Broken, &args, at(9, 6)).unwrap_err();
        assert_eq!(err.to_string(), "editor failed: editor crashed");
        assert_eq!(tracker.find(&alias).unwrap().notes.as_deref(), Some("keep"));
    }
}
