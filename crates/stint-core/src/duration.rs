//! Elapsed-time computation and presentation-time rounding.
//!
//! Rounding never touches stored data. Aggregates are summed exactly and
//! rounded once, since rounding each entry first would overstate (or
//! understate) the total.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::{Interval, TimeEntry};

/// Sum of all interval lengths, with an open interval measured up to `now`.
pub fn elapsed(stopwatch: &[Interval], now: DateTime<Utc>) -> Duration {
    stopwatch
        .iter()
        .map(|interval| interval.length(now))
        .fold(Duration::zero(), |acc, len| acc + len)
}

/// How durations are rounded for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMethod {
    /// Show exact durations.
    #[default]
    None,
    /// Round up to the next multiple of the interval.
    Up,
    /// Round down to the previous multiple of the interval.
    Down,
}

/// Granularity used by [`RoundingMethod::Up`] and [`RoundingMethod::Down`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoundingInterval {
    #[default]
    Quarter,
    Half,
    Hour,
}

/// A rounding interval outside 15, 30 or 60 minutes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid rounding interval {0}: expected 15, 30 or 60 minutes")]
pub struct InvalidRoundingInterval(pub u32);

impl RoundingInterval {
    pub const fn minutes(self) -> u32 {
        match self {
            Self::Quarter => 15,
            Self::Half => 30,
            Self::Hour => 60,
        }
    }

    const fn seconds(self) -> i64 {
        self.minutes() as i64 * 60
    }
}

impl TryFrom<u32> for RoundingInterval {
    type Error = InvalidRoundingInterval;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        match minutes {
            15 => Ok(Self::Quarter),
            30 => Ok(Self::Half),
            60 => Ok(Self::Hour),
            other => Err(InvalidRoundingInterval(other)),
        }
    }
}

impl From<RoundingInterval> for u32 {
    fn from(interval: RoundingInterval) -> Self {
        interval.minutes()
    }
}

impl Serialize for RoundingInterval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u32(self.minutes())
    }
}

impl<'de> Deserialize<'de> for RoundingInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let minutes = u32::deserialize(deserializer)?;
        Self::try_from(minutes).map_err(serde::de::Error::custom)
    }
}

/// Presentation-time rounding configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    #[serde(default)]
    pub method: RoundingMethod,
    #[serde(default)]
    pub interval: RoundingInterval,
}

impl RoundingPolicy {
    pub const fn new(method: RoundingMethod, interval: RoundingInterval) -> Self {
        Self { method, interval }
    }

    pub const fn is_exact(&self) -> bool {
        matches!(self.method, RoundingMethod::None)
    }

    /// Rounds `duration` to whole seconds, then to the configured interval.
    pub fn apply(&self, duration: Duration) -> Duration {
        let seconds = duration.num_seconds().max(0);
        let step = self.interval.seconds();
        let rounded = match self.method {
            RoundingMethod::None => return duration,
            RoundingMethod::Up => {
                if seconds % step == 0 {
                    seconds
                } else {
                    (seconds / step + 1) * step
                }
            }
            RoundingMethod::Down => seconds / step * step,
        };
        Duration::seconds(rounded)
    }
}

/// Exact and rounded durations for one entry or a whole selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub exact: Duration,
    pub rounded: Duration,
}

impl Totals {
    pub fn for_entry(entry: &TimeEntry, policy: RoundingPolicy, now: DateTime<Utc>) -> Self {
        let exact = entry.duration(now);
        Self {
            exact,
            rounded: policy.apply(exact),
        }
    }
}

/// Sums the unrounded durations of `entries` and rounds the sum once.
pub fn aggregate<'a, I>(entries: I, policy: RoundingPolicy, now: DateTime<Utc>) -> Totals
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    let exact = entries
        .into_iter()
        .map(|entry| entry.duration(now))
        .fold(Duration::zero(), |acc, d| acc + d);
    Totals {
        exact,
        rounded: policy.apply(exact),
    }
}

/// `HH:MM` or `HH:MM:SS` rendering of a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub duration: Duration,
    pub show_seconds: bool,
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.duration.num_seconds().max(0);
        let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);
        if self.show_seconds {
            write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
        } else {
            write!(f, "{hours:02}:{minutes:02}")
        }
    }
}

/// Formats a duration as `HH:MM` or `HH:MM:SS`.
pub fn format_clock(duration: Duration, show_seconds: bool) -> String {
    Clock {
        duration,
        show_seconds,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::types::{Alias, Status, Uid};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    fn minutes(n: i64) -> Duration {
        Duration::minutes(n)
    }

    fn entry_with(stopwatch: Vec<Interval>) -> TimeEntry {
        let mut entry = TimeEntry::new(
            Uid::generate(),
            Alias::new("ab12").unwrap(),
            "work".to_string(),
            at(8, 0),
        );
        entry.stopwatch = stopwatch;
        entry
    }

    const UP_15: RoundingPolicy = RoundingPolicy::new(RoundingMethod::Up, RoundingInterval::Quarter);
    const DOWN_60: RoundingPolicy = RoundingPolicy::new(RoundingMethod::Down, RoundingInterval::Hour);

    #[test]
    fn elapsed_sums_closed_and_open_intervals() {
        let stopwatch = vec![
            Interval::closed(at(9, 0), at(9, 30)),
            Interval::closed(at(10, 0), at(10, 45)),
            Interval::open(at(11, 0)),
        ];
        assert_eq!(elapsed(&stopwatch, at(11, 20)), minutes(30 + 45 + 20));
    }

    #[test]
    fn elapsed_of_empty_stopwatch_is_zero() {
        assert_eq!(elapsed(&[], at(12, 0)), Duration::zero());
    }

    #[test]
    fn running_duration_grows_and_stopped_duration_is_frozen() {
        let running = entry_with(vec![Interval::open(at(9, 0))]);
        let mut previous = Duration::zero();
        for minute in [0, 5, 30, 59] {
            let d = running.duration(at(10, minute));
            assert!(d >= previous);
            previous = d;
        }

        let mut stopped = entry_with(vec![Interval::closed(at(9, 0), at(10, 0))]);
        stopped.status = Status::Stopped;
        stopped.completed = Some(at(10, 0));
        assert_eq!(stopped.duration(at(11, 0)), stopped.duration(at(23, 0)));
    }

    #[test]
    fn round_up_one_minute_to_quarter_hour() {
        assert_eq!(UP_15.apply(minutes(1)), minutes(15));
    }

    #[test]
    fn round_up_keeps_exact_multiples_and_zero() {
        assert_eq!(UP_15.apply(minutes(30)), minutes(30));
        assert_eq!(UP_15.apply(Duration::zero()), Duration::zero());
    }

    #[test]
    fn round_up_counts_stray_seconds() {
        assert_eq!(UP_15.apply(minutes(30) + Duration::seconds(1)), minutes(45));
    }

    #[test]
    fn round_down_below_interval_is_zero() {
        assert_eq!(DOWN_60.apply(minutes(59)), Duration::zero());
        assert_eq!(DOWN_60.apply(minutes(121)), minutes(120));
    }

    #[test]
    fn round_none_is_identity() {
        let policy = RoundingPolicy::default();
        let d = minutes(37) + Duration::seconds(12);
        assert_eq!(policy.apply(d), d);
    }

    #[test]
    fn aggregate_rounds_once_after_summing() {
        let a = entry_with(vec![Interval::closed(at(9, 0), at(9, 40))]);
        let b = entry_with(vec![Interval::closed(at(10, 0), at(10, 40))]);

        let totals = aggregate([&a, &b], DOWN_60, at(12, 0));
        assert_eq!(totals.exact, minutes(80));
        assert_eq!(totals.rounded, minutes(60));

        let per_entry_sum =
            DOWN_60.apply(a.duration(at(12, 0))) + DOWN_60.apply(b.duration(at(12, 0)));
        assert_eq!(per_entry_sum, Duration::zero());
    }

    #[test]
    fn interval_deserializes_from_minutes() {
        let policy: RoundingPolicy =
            serde_json::from_str(r#"{"method": "down", "interval": 30}"#).unwrap();
        assert_eq!(
            policy,
            RoundingPolicy::new(RoundingMethod::Down, RoundingInterval::Half)
        );
        assert!(serde_json::from_str::<RoundingPolicy>(r#"{"interval": 20}"#).is_err());
    }

    #[test]
    fn clock_formats_hours_beyond_a_day() {
        let d = Duration::hours(26) + minutes(5) + Duration::seconds(9);
        assert_eq!(format_clock(d, false), "26:05");
        assert_eq!(format_clock(d, true), "26:05:09");
        assert_eq!(format_clock(Duration::zero(), true), "00:00:00");
    }
}
