//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, bail};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use stint_core::filter::local_to_utc;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(minute|min|m|hour|h|day|d|week|w)s?\s+ago$").unwrap()
});

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a user-supplied point in time.
///
/// Supports:
/// - RFC 3339: "2025-03-10T09:30:00Z"
/// - Local date and time: "2025-03-10 09:30", "2025-03-10 09:30:15"
/// - Local date (midnight): "2025-03-10"
/// - Local time today: "09:30"
/// - Relative: "90 minutes ago", "2 hours ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(local_to_utc(naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(local_to_utc(date.and_time(NaiveTime::MIN)));
    }
    for format in ["%H:%M:%S", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(s, format) {
            let today = now.with_timezone(&Local).date_naive();
            return Ok(local_to_utc(today.and_time(time)));
        }
    }

    let lowered = s.to_lowercase();
    let Some(caps) = RELATIVE_TIME_RE.captures(&lowered) else {
        bail!(
            "invalid time '{s}': use YYYY-MM-DD[ HH:MM[:SS]], HH:MM, RFC 3339 or relative (e.g. '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let minutes_per_unit = match &caps[2] {
        "minute" | "min" | "m" => 1,
        "hour" | "h" => 60,
        "day" | "d" => 60 * 24,
        "week" | "w" => 60 * 24 * 7,
        unit => bail!("unknown time unit: {unit}"),
    };

    if n > MAX_RELATIVE_MINUTES / minutes_per_unit {
        bail!("relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Joins positional words into one argument, so quoting is optional.
pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339() {
        assert_eq!(
            parse_datetime("2025-03-10T09:30:00Z", now()).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn parses_local_datetime_and_date() {
        let expected = Local
            .with_ymd_and_hms(2025, 3, 9, 8, 15, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parse_datetime("2025-03-09 08:15", now()).unwrap(), expected);

        let midnight = Local
            .with_ymd_and_hms(2025, 3, 9, 0, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parse_datetime("2025-03-09", now()).unwrap(), midnight);
    }

    #[test]
    fn parses_time_of_day_as_local_today() {
        let parsed = parse_datetime("07:45", now()).unwrap().with_timezone(&Local);
        assert_eq!(parsed.date_naive(), now().with_timezone(&Local).date_naive());
        assert_eq!(parsed.time(), NaiveTime::from_hms_opt(7, 45, 0).unwrap());
    }

    #[test]
    fn parses_relative_times() {
        assert_eq!(
            parse_datetime("90 minutes ago", now()).unwrap(),
            now() - Duration::minutes(90)
        );
        assert_eq!(
            parse_datetime("2 hours ago", now()).unwrap(),
            now() - Duration::hours(2)
        );
        assert_eq!(
            parse_datetime("1 week ago", now()).unwrap(),
            now() - Duration::weeks(1)
        );
    }

    #[test]
    fn relative_times_ignore_case() {
        assert_eq!(
            parse_datetime("3 Hours Ago", now()).unwrap(),
            now() - Duration::hours(3)
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_datetime("yesterday-ish", now()).unwrap_err();
        assert!(err.to_string().starts_with("invalid time 'yesterday-ish'"));
        assert!(parse_datetime("99999999999 weeks ago", now()).is_err());
    }
}
