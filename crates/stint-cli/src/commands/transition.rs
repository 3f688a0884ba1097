//! Pause, resume and stop commands.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use stint_core::{EntryStore, Tracker, format_clock};

use super::IdArgs;
use crate::Config;

pub fn pause<W: Write, S: EntryStore>(
    writer: &mut W,
    tracker: &mut Tracker<S>,
    args: &IdArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let entry = tracker.pause(&args.alias, now)?;
    writeln!(writer, "Paused {}.", entry.alias)?;
    Ok(())
}

pub fn resume<W: Write, S: EntryStore>(
    writer: &mut W,
    tracker: &mut Tracker<S>,
    args: &IdArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let entry = tracker.resume(&args.alias, now)?;
    writeln!(writer, "Resumed {}.", entry.alias)?;
    Ok(())
}

/// Stops the entry and reports its (rounded) total.
pub fn stop<W: Write, S: EntryStore>(
    writer: &mut W,
    tracker: &mut Tracker<S>,
    args: &IdArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let entry = tracker.stop(&args.alias, now)?;
    let time = config.rounding.apply(entry.duration(now));
    writeln!(
        writer,
        "Stopped {} after {}.",
        entry.alias,
        format_clock(time, config.show_seconds)
    )?;
    Ok(())
}
