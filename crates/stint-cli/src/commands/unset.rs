//! Unset command: clear tags or project.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use stint_core::{EntryStore, Tracker, UnsetField};

#[derive(Debug, Args)]
pub struct UnsetArgs {
    /// Alias (or uid) of the entry.
    pub alias: String,

    /// Field to clear: tags or project.
    pub field: String,
}

pub fn run<W: Write, S: EntryStore>(
    writer: &mut W,
    tracker: &mut Tracker<S>,
    args: &UnsetArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let field: UnsetField = args.field.parse()?;
    let entry = tracker.unset(&args.alias, field, now)?;
    writeln!(
        writer,
        "Cleared {} on {}.",
        args.field.trim().to_lowercase(),
        entry.alias
    )?;
    Ok(())
}
