//! Human-readable output: time reports, entry lists and the info view.

use std::fmt::Write;

use chrono::{DateTime, Duration, Local, Timelike, Utc};

use crate::duration::{RoundingPolicy, Totals, aggregate, format_clock};
use crate::entry::TimeEntry;

/// Shown instead of a table when nothing is selected.
pub const EMPTY_SELECTION: &str = "None";

/// `YYYY-MM-DD HH:MM` in local time, or just the date at local midnight.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    let local = at.with_timezone(&Local);
    if local.hour() == 0 && local.minute() == 0 {
        local.format("%Y-%m-%d").to_string()
    } else {
        local.format("%Y-%m-%d %H:%M").to_string()
    }
}

fn format_full(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Renders rows as left-aligned columns separated by two spaces.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_row(&mut output, &widths, headers.iter().copied());
    for row in rows {
        push_row(&mut output, &widths, row.iter().map(String::as_str));
    }
    output
}

fn push_row<'a>(output: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let mut line = String::new();
    for (cell, width) in cells.zip(widths.iter().copied()) {
        write!(line, "{cell:<width$}  ").unwrap();
    }
    writeln!(output, "{}", line.trim_end()).unwrap();
}

fn tag_list(entry: &TimeEntry) -> String {
    entry.tags.join(", ")
}

/// One line of a time report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub alias: String,
    pub completed: Option<DateTime<Utc>>,
    pub time: Duration,
    pub description: String,
    pub project: Option<String>,
    pub tags: String,
}

/// A time report over a selection of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub rows: Vec<ReportRow>,
    pub total: Totals,
    pub rounded: bool,
}

/// Sorts `entries` by completion (uncompleted last, by start) and totals
/// them.
pub fn build_report(
    entries: &[&TimeEntry],
    view: &str,
    policy: RoundingPolicy,
    now: DateTime<Utc>,
) -> Report {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|entry| (entry.completed.is_none(), entry.completed, entry.started));

    let rows = sorted
        .iter()
        .map(|entry| ReportRow {
            alias: entry.alias.to_string(),
            completed: entry.completed,
            time: Totals::for_entry(entry, policy, now).rounded,
            description: entry.description.clone(),
            project: entry.project.clone(),
            tags: tag_list(entry),
        })
        .collect();

    Report {
        title: format!("Time report - {view}"),
        rows,
        total: aggregate(sorted.iter().copied(), policy, now),
        rounded: !policy.is_exact(),
    }
}

pub fn format_report(report: &Report, show_seconds: bool) -> String {
    let mut output = String::new();
    writeln!(output, "{}", report.title).unwrap();
    writeln!(output).unwrap();

    if report.rows.is_empty() {
        writeln!(output, "{EMPTY_SELECTION}").unwrap();
        return output;
    }

    let rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|row| {
            vec![
                row.alias.clone(),
                row.completed.map(format_timestamp).unwrap_or_default(),
                format_clock(row.time, show_seconds),
                row.description.clone(),
                row.project.clone().unwrap_or_default(),
                row.tags.clone(),
            ]
        })
        .collect();
    output.push_str(&render_table(
        &["alias", "completed", "time", "description", "project", "tags"],
        &rows,
    ));
    writeln!(output).unwrap();

    let total = format_clock(report.total.rounded, show_seconds);
    if report.rounded {
        let exact = format_clock(report.total.exact, show_seconds);
        writeln!(output, "Total: {total} (unrounded {exact})").unwrap();
    } else {
        writeln!(output, "Total: {total}").unwrap();
    }
    output
}

/// Table of open entries for `list`.
pub fn format_list(
    entries: &[&TimeEntry],
    policy: RoundingPolicy,
    now: DateTime<Utc>,
    show_seconds: bool,
) -> String {
    if entries.is_empty() {
        return format!("{EMPTY_SELECTION}\n");
    }
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.alias.to_string(),
                entry.status.to_string(),
                format_clock(Totals::for_entry(entry, policy, now).rounded, show_seconds),
                entry.description.clone(),
                entry.project.clone().unwrap_or_default(),
                tag_list(entry),
            ]
        })
        .collect();
    render_table(
        &["alias", "status", "time", "description", "project", "tags"],
        &rows,
    )
}

/// Full view of one entry, with 1-based interval numbers.
pub fn format_info(entry: &TimeEntry, policy: RoundingPolicy, now: DateTime<Utc>) -> String {
    let totals = Totals::for_entry(entry, policy, now);
    let optional = |at: Option<DateTime<Utc>>| at.map(format_full).unwrap_or_default();

    let mut output = String::new();
    let mut field = |name: &str, value: &str| {
        let label = format!("{name}:");
        writeln!(output, "{label:<14}{value}").unwrap();
    };
    field("uid", entry.uid.as_str());
    field("alias", entry.alias.as_str());
    field("status", entry.status.as_str());
    field("description", &entry.description);
    field("project", entry.project.as_deref().unwrap_or_default());
    field("tags", &tag_list(entry));
    field("time", &format_clock(totals.exact, true));
    if !policy.is_exact() {
        field("rounded time", &format_clock(totals.rounded, true));
    }
    field("created", &format_full(entry.created));
    field("updated", &format_full(entry.updated));
    field("started", &optional(entry.started));
    field("completed", &optional(entry.completed));

    writeln!(output, "stopwatch:").unwrap();
    for (number, interval) in entry.stopwatch.iter().enumerate() {
        let stop = interval
            .stop
            .map_or_else(|| "running".to_string(), format_full);
        writeln!(
            output,
            "  [{}] {} - {} ({})",
            number + 1,
            format_full(interval.start),
            stop,
            format_clock(interval.length(now), true)
        )
        .unwrap();
    }

    if let Some(notes) = &entry.notes {
        writeln!(output, "notes:").unwrap();
        for line in notes.lines() {
            writeln!(output, "  {line}").unwrap();
        }
    }
    output
}
