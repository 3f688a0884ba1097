//! Info command: show every field of one entry.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use stint_core::report::format_info;
use stint_core::{EntryStore, Tracker};

use super::IdArgs;
use crate::Config;

pub fn run<W: Write, S: EntryStore>(
    writer: &mut W,
    tracker: &Tracker<S>,
    args: &IdArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let entry = tracker.find(&args.alias)?;
    write!(writer, "{}", format_info(entry, config.rounding, now))?;
    Ok(())
}
