//! Entry state machine: pause/resume/stop, status overrides, interval
//! deletion and field edits.
//!
//! Every operation either succeeds and leaves the entry consistent with the
//! state invariants, or fails and leaves it untouched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entry::{Interval, TimeEntry};
use crate::types::{Status, ValidationError};

/// Errors from entry lookups and transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// No loaded entry has the given alias or uid.
    #[error("entry '{id}' not found")]
    NotFound { id: String },

    /// The operation is not allowed from the entry's current state.
    #[error("cannot {operation} '{alias}': entry is {status}")]
    InvalidTransition {
        alias: String,
        operation: &'static str,
        status: Status,
    },

    /// A supplied value was rejected.
    #[error("invalid {field} '{value}': {reason}")]
    InvalidArgument {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl EntryError {
    pub(crate) fn invalid(field: &'static str, value: impl fmt::Display, reason: &str) -> Self {
        Self::InvalidArgument {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn transition(entry: &TimeEntry, operation: &'static str) -> Self {
        Self::InvalidTransition {
            alias: entry.alias.to_string(),
            operation,
            status: entry.status,
        }
    }
}

/// Closes the open interval of a running entry.
pub fn pause(entry: &mut TimeEntry, now: DateTime<Utc>) -> Result<(), EntryError> {
    if !entry.is_running() {
        return Err(EntryError::transition(entry, "pause"));
    }
    close_open_interval(entry, now);
    entry.status = Status::Paused;
    entry.updated = now;
    Ok(())
}

/// Opens a new interval on a paused entry.
pub fn resume(entry: &mut TimeEntry, now: DateTime<Utc>) -> Result<(), EntryError> {
    if !entry.is_paused() {
        return Err(EntryError::transition(entry, "resume"));
    }
    entry.stopwatch.push(Interval::open(now));
    entry.status = Status::Running;
    entry.updated = now;
    Ok(())
}

/// Completes a running or paused entry.
pub fn stop(entry: &mut TimeEntry, now: DateTime<Utc>) -> Result<(), EntryError> {
    if entry.status == Status::Stopped {
        return Err(EntryError::transition(entry, "stop"));
    }
    close_open_interval(entry, now);
    entry.completed = Some(now);
    entry.status = Status::Stopped;
    entry.updated = now;
    Ok(())
}

/// Sets the status directly, repairing the interval list to match.
///
/// Moving to `paused` requires at least one recorded interval; every other
/// override is always possible. Reopening a stopped entry as `running`
/// starts a fresh interval at `now`.
pub fn override_status(
    entry: &mut TimeEntry,
    status: Status,
    now: DateTime<Utc>,
) -> Result<(), EntryError> {
    match status {
        Status::Running => {
            if entry.open_interval().is_none() {
                entry.stopwatch.push(Interval::open(now));
            }
            entry.completed = None;
        }
        Status::Paused => {
            if entry.stopwatch.is_empty() {
                return Err(EntryError::transition(entry, "mark as paused"));
            }
            close_open_interval(entry, now);
            entry.completed = None;
        }
        Status::Stopped => {
            close_open_interval(entry, now);
            entry.completed.get_or_insert(now);
        }
    }
    entry.status = status;
    entry.updated = now;
    Ok(())
}

/// Removes the intervals at the given 0-based positions.
///
/// All positions are checked against the current list before anything is
/// removed; removal happens highest-first so every position refers to the
/// list as it was.
pub fn delete_intervals(
    entry: &mut TimeEntry,
    positions: &[usize],
    now: DateTime<Utc>,
) -> Result<(), EntryError> {
    let mut positions = positions.to_vec();
    positions.sort_unstable();
    positions.dedup();

    for &position in &positions {
        let Some(interval) = entry.stopwatch.get(position) else {
            return Err(EntryError::invalid(
                "interval",
                position + 1,
                &format!("entry has {} interval(s)", entry.stopwatch.len()),
            ));
        };
        if interval.is_open() {
            return Err(EntryError::invalid(
                "interval",
                position + 1,
                "cannot delete the running interval",
            ));
        }
    }
    if entry.status == Status::Paused && positions.len() == entry.stopwatch.len() {
        return Err(EntryError::invalid(
            "interval",
            positions.len(),
            "a paused entry must keep at least one interval",
        ));
    }

    for &position in positions.iter().rev() {
        entry.stopwatch.remove(position);
    }
    entry.updated = now;
    Ok(())
}

fn close_open_interval(entry: &mut TimeEntry, now: DateTime<Utc>) {
    if let Some(last) = entry.stopwatch.last_mut() {
        if last.is_open() {
            last.stop = Some(now.max(last.start));
        }
    }
}

/// A change to an entry's tag list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagUpdate {
    /// Replace all tags.
    Replace(Vec<String>),
    /// Remove, then add, individual tags.
    Edit { add: Vec<String>, remove: Vec<String> },
}

impl TagUpdate {
    /// Applies the update, keeping existing tags in their display order.
    pub fn apply(&self, tags: &mut Vec<String>) {
        match self {
            Self::Replace(new) => {
                tags.clear();
                push_unique(tags, new);
            }
            Self::Edit { add, remove } => {
                tags.retain(|tag| !remove.contains(tag));
                push_unique(tags, add);
            }
        }
    }
}

fn push_unique(tags: &mut Vec<String>, new: &[String]) {
    for tag in new {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
}

impl FromStr for TagUpdate {
    type Err = EntryError;

    /// Parses `a,b`, or `+a,~b`. Mixing plain and prefixed tags is rejected,
    /// as is a list without a single tag name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut replace = Vec::new();
        let mut add = Vec::new();
        let mut remove = Vec::new();
        let mut prefixed = false;

        for raw in s.split(',') {
            let raw = raw.trim().to_lowercase();
            let (target, tag) = if let Some(tag) = raw.strip_prefix('+') {
                prefixed = true;
                (&mut add, tag.trim())
            } else if let Some(tag) = raw.strip_prefix('~') {
                prefixed = true;
                (&mut remove, tag.trim())
            } else {
                (&mut replace, raw.as_str())
            };
            if tag.is_empty() {
                continue;
            }
            target.push(tag.to_string());
        }

        if !replace.is_empty() && prefixed {
            return Err(EntryError::invalid(
                "tags",
                s,
                "cannot mix replacement tags with +add/~remove tags",
            ));
        }
        if replace.is_empty() && add.is_empty() && remove.is_empty() {
            return Err(EntryError::invalid(
                "tags",
                s,
                "no tag names given; use `unset` to clear tags",
            ));
        }
        if prefixed {
            Ok(Self::Edit { add, remove })
        } else {
            Ok(Self::Replace(replace))
        }
    }
}

/// Fields that may be cleared with `unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsetField {
    Tags,
    Project,
}

impl FromStr for UnsetField {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tags" => Ok(Self::Tags),
            "project" => Ok(Self::Project),
            _ => Err(EntryError::invalid(
                "field",
                s,
                "only tags and project can be cleared",
            )),
        }
    }
}

/// Clears a field.
pub fn unset(entry: &mut TimeEntry, field: UnsetField, now: DateTime<Utc>) {
    match field {
        UnsetField::Tags => entry.tags.clear(),
        UnsetField::Project => entry.project = None,
    }
    entry.updated = now;
}

/// A set of field edits applied together by `modify`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modification {
    pub description: Option<String>,
    pub project: Option<String>,
    pub tags: Option<TagUpdate>,
    pub started: Option<DateTime<Utc>>,
    pub completed: Option<DateTime<Utc>>,
    pub status: Option<Status>,
    pub notes: Option<String>,
    /// 0-based positions in the stopwatch.
    pub delete_intervals: Vec<usize>,
}

impl Modification {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Applies `change` to `entry`; on error the entry is left unchanged.
///
/// Order: status override, interval deletion, timestamps, then text fields,
/// so a `completed` override can accompany a move to `stopped`. A
/// `completed` override on a running or paused entry stops it at that time.
pub fn modify(
    entry: &mut TimeEntry,
    change: &Modification,
    now: DateTime<Utc>,
) -> Result<(), EntryError> {
    let mut next = entry.clone();

    if let Some(status) = change.status {
        override_status(&mut next, status, now)?;
    }
    if !change.delete_intervals.is_empty() {
        delete_intervals(&mut next, &change.delete_intervals, now)?;
    }
    if let Some(started) = change.started {
        next.started = Some(started);
    }
    if let Some(completed) = change.completed {
        if matches!(change.status, Some(Status::Running | Status::Paused)) {
            return Err(EntryError::invalid(
                "completed",
                completed.to_rfc3339(),
                "only stopped entries have a completion time",
            ));
        }
        if next.status != Status::Stopped {
            override_status(&mut next, Status::Stopped, completed)?;
        }
        next.completed = Some(completed);
    }
    if let Some(description) = &change.description {
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::Empty {
                field: "description",
            }
            .into());
        }
        next.description = description.to_string();
    }
    if let Some(project) = &change.project {
        next.project = Some(normalize_project(project)?);
    }
    if let Some(tags) = &change.tags {
        tags.apply(&mut next.tags);
    }
    if let Some(notes) = &change.notes {
        next.notes = normalize_notes(notes);
    }

    next.updated = now;
    debug_assert!(
        !entry.is_consistent() || next.is_consistent(),
        "modify broke a consistent entry"
    );
    *entry = next;
    Ok(())
}

/// Lowercases a project name, rejecting blank names.
pub fn normalize_project(project: &str) -> Result<String, EntryError> {
    let project = project.trim().to_lowercase();
    if project.is_empty() {
        return Err(ValidationError::Empty { field: "project" }.into());
    }
    Ok(project)
}

/// Blank notes clear the field.
pub fn normalize_notes(notes: &str) -> Option<String> {
    if notes.trim().is_empty() {
        None
    } else {
        Some(notes.to_string())
    }
}
