//! Query command: tab-delimited or JSON output for scripts.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use stint_core::query::{format_tab, json_document};
use stint_core::{EntryStore, FieldLimit, SearchTerm, Tracker};

use super::util::join_words;

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Search term, e.g. `status=running+paused` or `project=apollo%tags=meeting`.
    #[arg(required = true, num_args = 1..)]
    pub term: Vec<String>,

    /// Comma-separated fields to print. Ignored with `--json`.
    #[arg(short, long, value_name = "FIELDS")]
    pub limit: Option<String>,

    /// Print a JSON document instead of tab-delimited rows.
    #[arg(short, long)]
    pub json: bool,
}

pub fn run<W: Write, S: EntryStore>(
    writer: &mut W,
    tracker: &Tracker<S>,
    args: &QueryArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let term = SearchTerm::parse(&join_words(&args.term))?;
    let entries = tracker.select(&term);

    if args.json {
        let document = json_document(&entries, now)?;
        writeln!(writer, "{}", serde_json::to_string_pretty(&document)?)?;
        return Ok(());
    }

    let limit = match &args.limit {
        Some(list) => FieldLimit::parse(list)?,
        None => FieldLimit::default(),
    };
    write!(writer, "{}", format_tab(&entries, &limit, now))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::Value;

    use crate::commands::testing::{at, output, start, tracker};

    fn args(term: &str) -> QueryArgs {
        QueryArgs {
            term: vec![term.to_string()],
            limit: None,
            json: false,
        }
    }

    #[test]
    fn tab_output_with_limit() {
        let mut tracker = tracker();
        let review = start(&mut tracker, "review");
        let docs = start(&mut tracker, "write docs");
        tracker.pause(&docs, at(9, 30)).unwrap();

        let mut buffer = Vec::new();
        let query = QueryArgs {
            limit: Some("status,alias".to_string()),
            ..args("status=running+paused")
        };
        run(&mut buffer, &tracker, &query, at(10, 0)).unwrap();

        let text = output(buffer);
        let mut lines: Vec<&str> = text.lines().collect();
        lines.sort_unstable();
        let mut expected = vec![format!("{review}\trunning"), format!("{docs}\tpaused")];
        expected.sort_unstable();
        assert_eq!(lines, expected);
    }

    #[test]
    fn no_results() {
        let tracker = tracker();
        let mut buffer = Vec::new();
        run(&mut buffer, &tracker, &args("status=stopped"), at(10, 0)).unwrap();
        assert_eq!(output(buffer), "No results.\n");
    }

    #[test]
    fn json_output() {
        let mut tracker = tracker();
        let review = start(&mut tracker, "review");

        let mut buffer = Vec::new();
        let query = QueryArgs {
            json: true,
            ..args("description=rev")
        };
        run(&mut buffer, &tracker, &query, at(9, 45)).unwrap();

        let document: Value = serde_json::from_str(&output(buffer)).unwrap();
        let entries = document["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["alias"], review.as_str());
        assert_eq!(entries[0]["status"], "running");
        assert_eq!(entries[0]["time"], "00:45:00");
    }

    #[test]
    fn json_ignores_limit() {
        let mut tracker = tracker();
        start(&mut tracker, "review");

        let mut buffer = Vec::new();
        let query = QueryArgs {
            limit: Some("alias".to_string()),
            json: true,
            ..args("any")
        };
        run(&mut buffer, &tracker, &query, at(9, 45)).unwrap();

        let document: Value = serde_json::from_str(&output(buffer)).unwrap();
        let entry = document["entries"][0].as_object().unwrap();
        for field in [
            "uid",
            "alias",
            "status",
            "description",
            "project",
            "tags",
            "created",
            "updated",
            "started",
            "completed",
            "time",
            "stopwatch",
            "notes",
        ] {
            assert!(entry.contains_key(field), "missing {field}");
        }
    }

    #[test]
    fn unknown_limit_field() {
        let tracker = tracker();
        let query = QueryArgs {
            limit: Some("alias,colour".to_string()),
            ..args("status=running")
        };
        let err = run(&mut Vec::new(), &tracker, &query, at(10, 0)).unwrap_err();
        assert!(err.to_string().starts_with("invalid limit field 'colour'"));
    }
}
