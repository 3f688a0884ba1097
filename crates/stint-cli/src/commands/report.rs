//! Report command: totals for a named window or a search term.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use clap::Args;
use stint_core::report::{build_report, format_report};
use stint_core::{EntryStore, ReportTerm, Tracker};

use super::util::join_words;
use crate::Config;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Window (today, yesterday, thisweek, lastweek, thismonth, lastmonth,
    /// thisyear, lastyear) with an optional `%exclusion`, or a search term.
    #[arg(required = true, num_args = 1..)]
    pub term: Vec<String>,
}

pub fn run<W: Write, S: EntryStore>(
    writer: &mut W,
    tracker: &Tracker<S>,
    args: &ReportArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let today = now.with_timezone(&Local).date_naive();
    let term = ReportTerm::parse(&join_words(&args.term), today, config.first_weekday)?;
    tracing::debug!(?term, "parsed report term");

    let entries = tracker.select(&term.term);
    let report = build_report(&entries, &term.view, config.rounding, now);
    write!(writer, "{}", format_report(&report, config.show_seconds))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use stint_core::{RoundingInterval, RoundingMethod, RoundingPolicy};

    use crate::commands::testing::{at, config, output, start, tracker};

    fn term(words: &[&str]) -> ReportArgs {
        ReportArgs {
            term: words.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn today_report_totals_stopped_entries() {
        let mut tracker = tracker();
        let review = start(&mut tracker, "review");
        let docs = start(&mut tracker, "write docs");
        start(&mut tracker, "still going");
        tracker.stop(&review, at(9, 20)).unwrap();
        tracker.stop(&docs, at(10, 30)).unwrap();

        let mut buffer = Vec::new();
        run(&mut buffer, &tracker, &term(&["today"]), &config(), at(11, 0)).unwrap();
        let text = output(buffer);

        assert!(text.starts_with("Time report - today\n\n"));
        assert!(text.contains("review"));
        assert!(text.contains("write docs"));
        assert!(!text.contains("still going"));
        assert!(text.ends_with("Total: 01:50\n"));
    }

    #[test]
    fn window_exclusion_and_rounding() {
        let mut tracker = tracker();
        let review = start(&mut tracker, "review");
        let docs = start(&mut tracker, "write docs");
        tracker.stop(&review, at(9, 20)).unwrap();
        tracker.stop(&docs, at(10, 30)).unwrap();
        let config = Config {
            rounding: RoundingPolicy::new(RoundingMethod::Up, RoundingInterval::Quarter),
            ..config()
        };

        let mut buffer = Vec::new();
        let args = term(&["today%description=docs"]);
        run(&mut buffer, &tracker, &args, &config, at(11, 0)).unwrap();
        let text = output(buffer);

        assert!(!text.contains("write docs"));
        assert!(text.ends_with("Total: 00:30 (unrounded 00:20)\n"));
    }

    #[test]
    fn search_term_report_with_no_matches() {
        let tracker = tracker();
        let mut buffer = Vec::new();
        run(&mut buffer, &tracker, &term(&["project=apollo"]), &config(), at(11, 0)).unwrap();
        assert_eq!(output(buffer), "Time report - project=apollo\n\nNone\n");
    }

    #[test]
    fn malformed_term_is_an_error() {
        let tracker = tracker();
        let err = run(&mut Vec::new(), &tracker, &term(&["a%b%c"]), &config(), at(11, 0))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid search term 'a%b%c': only one '%' exclusion separator is allowed"
        );
    }
}
