//! Start command: create a running entry.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use stint_core::{EntryStore, StartRequest, Tracker};

use super::util::{join_words, parse_datetime};

#[derive(Debug, Args)]
pub struct StartArgs {
    /// What you are working on.
    #[arg(required = true)]
    pub description: Vec<String>,

    /// Project the entry belongs to.
    #[arg(short, long)]
    pub project: Option<String>,

    /// Comma-separated tags.
    #[arg(short, long)]
    pub tags: Option<String>,

    /// Start time if not now (e.g. "09:15", "2025-03-10 09:15", "20 minutes ago").
    #[arg(long)]
    pub at: Option<String>,
}

pub fn run<W: Write, S: EntryStore>(
    writer: &mut W,
    tracker: &mut Tracker<S>,
    args: &StartArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let at = args
        .at
        .as_deref()
        .map(|at| parse_datetime(at, now))
        .transpose()?;
    let tags = args
        .tags
        .as_deref()
        .map(|tags| tags.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let request = StartRequest {
        description: join_words(&args.description),
        project: args.project.clone(),
        tags,
        at,
    };
    let entry = tracker.start(request, now)?;
    writeln!(writer, "Started {}: {}", entry.alias, entry.description)?;
    Ok(())
}
