//! Delete command: remove an entry after confirmation.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;
use stint_core::{EntryStore, Tracker};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Alias (or uid) of the entry.
    pub alias: String,

    /// Delete without asking.
    #[arg(short, long)]
    pub force: bool,
}

/// Deletes the entry, asking on `writer` and reading the answer from `input`
/// unless `--force` is given.
pub fn run<W: Write, R: BufRead, S: EntryStore>(
    writer: &mut W,
    input: &mut R,
    tracker: &mut Tracker<S>,
    args: &DeleteArgs,
) -> Result<()> {
    let entry = tracker.find(&args.alias)?;
    if !args.force {
        write!(
            writer,
            "Delete {} ({})? [y/N] ",
            entry.alias, entry.description
        )?;
        writer.flush()?;
        let mut answer = String::new();
        input
            .read_line(&mut answer)
            .context("failed to read confirmation")?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            writeln!(writer, "Aborted.")?;
            return Ok(());
        }
    }

    let removed = tracker.delete(&args.alias)?;
    writeln!(writer, "Deleted {}.", removed.alias)?;
    Ok(())
}
