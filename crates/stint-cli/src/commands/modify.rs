//! Modify command: edit fields, override status, delete intervals.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clap::Args;
use stint_core::{EntryStore, Modification, Status, TagUpdate, Tracker};

use super::util::parse_datetime;

#[derive(Debug, Args)]
pub struct ModifyArgs {
    /// Alias (or uid) of the entry.
    pub alias: String,

    /// New description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// New project.
    #[arg(short, long)]
    pub project: Option<String>,

    /// Tags: "a,b" replaces all tags; "+a,~b" adds a and removes b.
    #[arg(short, long)]
    pub tags: Option<String>,

    /// Override the start timestamp.
    #[arg(long)]
    pub started: Option<String>,

    /// Override the completion timestamp (stopped entries only).
    #[arg(long)]
    pub completed: Option<String>,

    /// Override the status: running, paused or stopped.
    #[arg(long)]
    pub status: Option<String>,

    /// Replace the notes; an empty string clears them.
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Delete a stopwatch interval by its number in `info` (repeatable).
    #[arg(long = "del-time", value_name = "N")]
    pub del_time: Vec<usize>,
}

impl ModifyArgs {
    fn modification(&self, now: DateTime<Utc>) -> Result<Modification> {
        let parse_time =
            |value: Option<&str>| value.map(|value| parse_datetime(value, now)).transpose();
        let mut delete_intervals = Vec::with_capacity(self.del_time.len());
        for &number in &self.del_time {
            if number == 0 {
                bail!("interval numbers start at 1");
            }
            delete_intervals.push(number - 1);
        }

        Ok(Modification {
            description: self.description.clone(),
            project: self.project.clone(),
            tags: self.tags.as_deref().map(str::parse::<TagUpdate>).transpose()?,
            started: parse_time(self.started.as_deref())?,
            completed: parse_time(self.completed.as_deref())?,
            status: self.status.as_deref().map(str::parse::<Status>).transpose()?,
            notes: self.notes.clone(),
            delete_intervals,
        })
    }
}

pub fn run<W: Write, S: EntryStore>(
    writer: &mut W,
    tracker: &mut Tracker<S>,
    args: &ModifyArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let change = args.modification(now)?;
    if change.is_empty() {
        bail!("nothing to modify: pass at least one field option");
    }
    let entry = tracker.modify(&args.alias, &change, now)?;
    writeln!(writer, "Modified {}.", entry.alias)?;
    Ok(())
}
