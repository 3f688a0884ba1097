//! List command: show running and paused entries.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use stint_core::report::format_list;
use stint_core::{EntryStore, ListView, Tracker};

use crate::Config;

/// Which open entries to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListFilter {
    /// Running and paused entries.
    #[default]
    All,
    Running,
    Paused,
}

impl From<ListFilter> for ListView {
    fn from(filter: ListFilter) -> Self {
        match filter {
            ListFilter::All => Self::All,
            ListFilter::Running => Self::Running,
            ListFilter::Paused => Self::Paused,
        }
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(value_enum, default_value_t = ListFilter::All)]
    pub view: ListFilter,
}

pub fn run<W: Write, S: EntryStore>(
    writer: &mut W,
    tracker: &Tracker<S>,
    args: &ListArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let entries = tracker.list(args.view.into());
    write!(
        writer,
        "{}",
        format_list(&entries, config.rounding, now, config.show_seconds)
    )?;
    Ok(())
}
