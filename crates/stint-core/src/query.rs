//! Machine-readable projections of selected entries.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::duration::format_clock;
use crate::entry::{Interval, TimeEntry};
use crate::report::format_timestamp;
use crate::types::Status;

/// Printed instead of tab-delimited rows when nothing matched.
pub const NO_RESULTS: &str = "No results.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error(
        "invalid limit field '{field}': expected uid, alias, status, started, completed, time, description, project or tags"
    )]
    UnknownField { field: String },
}

/// A column of the tab-delimited output, declared in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QueryField {
    Uid,
    Alias,
    Status,
    Started,
    Completed,
    Time,
    Description,
    Project,
    Tags,
}

impl QueryField {
    pub const ALL: [Self; 9] = [
        Self::Uid,
        Self::Alias,
        Self::Status,
        Self::Started,
        Self::Completed,
        Self::Time,
        Self::Description,
        Self::Project,
        Self::Tags,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Uid => "uid",
            Self::Alias => "alias",
            Self::Status => "status",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Time => "time",
            Self::Description => "description",
            Self::Project => "project",
            Self::Tags => "tags",
        }
    }

    fn render(self, entry: &TimeEntry, now: DateTime<Utc>) -> String {
        match self {
            Self::Uid => entry.uid.to_string(),
            Self::Alias => entry.alias.to_string(),
            Self::Status => entry.status.to_string(),
            Self::Started => entry.started.map(format_timestamp).unwrap_or_default(),
            Self::Completed => entry.completed.map(format_timestamp).unwrap_or_default(),
            Self::Time => format_clock(entry.duration(now), true),
            Self::Description => entry.description.clone(),
            Self::Project => entry.project.clone().unwrap_or_default(),
            Self::Tags => format!("[{}]", entry.tags.join(", ")),
        }
    }
}

/// The set of columns to print, always in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLimit(Vec<QueryField>);

impl Default for FieldLimit {
    fn default() -> Self {
        Self(QueryField::ALL.to_vec())
    }
}

impl FieldLimit {
    /// Parses a comma-separated list of field names. Order and repetition
    /// in the input are ignored.
    pub fn parse(list: &str) -> Result<Self, QueryError> {
        let mut fields = Vec::new();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let lowered = name.to_lowercase();
            let field = QueryField::ALL
                .into_iter()
                .find(|f| f.name() == lowered)
                .ok_or_else(|| QueryError::UnknownField {
                    field: name.to_string(),
                })?;
            fields.push(field);
        }
        if fields.is_empty() {
            return Ok(Self::default());
        }
        fields.sort_unstable();
        fields.dedup();
        Ok(Self(fields))
    }

    pub fn fields(&self) -> &[QueryField] {
        &self.0
    }
}

/// One tab-delimited line for `entry`.
pub fn tab_row(entry: &TimeEntry, limit: &FieldLimit, now: DateTime<Utc>) -> String {
    limit
        .fields()
        .iter()
        .map(|field| field.render(entry, now))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Tab-delimited lines for `entries`, or [`NO_RESULTS`].
pub fn format_tab(entries: &[&TimeEntry], limit: &FieldLimit, now: DateTime<Utc>) -> String {
    if entries.is_empty() {
        return format!("{NO_RESULTS}\n");
    }
    let mut output = String::new();
    for entry in entries {
        writeln!(output, "{}", tab_row(entry, limit, now)).unwrap();
    }
    output
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    uid: &'a str,
    alias: &'a str,
    status: Status,
    description: &'a str,
    project: Option<&'a str>,
    tags: &'a [String],
    created: DateTime<Local>,
    updated: DateTime<Local>,
    started: Option<DateTime<Local>>,
    completed: Option<DateTime<Local>>,
    time: String,
    stopwatch: Vec<JsonInterval>,
    notes: Option<&'a str>,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

#[derive(Serialize)]
struct JsonInterval {
    start: DateTime<Local>,
    stop: Option<DateTime<Local>>,
}

impl From<&Interval> for JsonInterval {
    fn from(interval: &Interval) -> Self {
        Self {
            start: interval.start.with_timezone(&Local),
            stop: interval.stop.map(|stop| stop.with_timezone(&Local)),
        }
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    entries: Vec<JsonEntry<'a>>,
}

fn json_entry(entry: &TimeEntry, now: DateTime<Utc>) -> JsonEntry<'_> {
    let local = |at: DateTime<Utc>| at.with_timezone(&Local);
    JsonEntry {
        uid: entry.uid.as_str(),
        alias: entry.alias.as_str(),
        status: entry.status,
        description: &entry.description,
        project: entry.project.as_deref(),
        tags: &entry.tags,
        created: local(entry.created),
        updated: local(entry.updated),
        started: entry.started.map(local),
        completed: entry.completed.map(local),
        time: format_clock(entry.duration(now), true),
        stopwatch: entry.stopwatch.iter().map(JsonInterval::from).collect(),
        notes: entry.notes.as_deref(),
        extra: &entry.extra,
    }
}

/// `{"entries": [...]}` with every field of every entry.
pub fn json_document(entries: &[&TimeEntry], now: DateTime<Utc>) -> serde_json::Result<Value> {
    let document = JsonDocument {
        entries: entries.iter().map(|entry| json_entry(entry, now)).collect(),
    };
    serde_json::to_value(document)
}
