//! The persisted time entry record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::duration;
use crate::types::{Alias, Status, Uid};

/// One contiguous span of tracked time.
///
/// An interval without `stop` is open: the clock is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<DateTime<Utc>>,
}

impl Interval {
    /// Creates an open interval starting at `start`.
    pub const fn open(start: DateTime<Utc>) -> Self {
        Self { start, stop: None }
    }

    /// Creates a closed interval.
    pub const fn closed(start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        Self {
            start,
            stop: Some(stop),
        }
    }

    pub const fn is_open(&self) -> bool {
        self.stop.is_none()
    }

    /// Length of the interval, measuring an open interval up to `now`.
    ///
    /// Never negative.
    pub fn length(&self, now: DateTime<Utc>) -> Duration {
        let stop = self.stop.unwrap_or(now);
        (stop - self.start).max(Duration::zero())
    }
}

/// A tracked unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub uid: Uid,
    pub alias: Alias,
    pub description: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub tags: Vec<String>,
    pub status: Status,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub stopwatch: Vec<Interval>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Fields this version does not know about, kept for round-trip fidelity.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts `null` wherever a list is expected.
fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TimeEntry {
    /// Creates a running entry with one open interval starting at `at`.
    pub fn new(uid: Uid, alias: Alias, description: String, at: DateTime<Utc>) -> Self {
        Self {
            uid,
            alias,
            description,
            project: None,
            tags: Vec::new(),
            status: Status::Running,
            created: at,
            updated: at,
            started: Some(at),
            completed: None,
            stopwatch: vec![Interval::open(at)],
            notes: None,
            extra: Map::new(),
        }
    }

    /// The open interval, if any.
    pub fn open_interval(&self) -> Option<&Interval> {
        self.stopwatch.last().filter(|interval| interval.is_open())
    }

    /// The status implied by the interval list and `completed`.
    ///
    /// Returns `None` for an entry that satisfies none of the state
    /// predicates (no intervals and not completed).
    pub fn derived_status(&self) -> Option<Status> {
        match self.stopwatch.last() {
            Some(last) if last.is_open() => Some(Status::Running),
            _ if self.completed.is_some() => Some(Status::Stopped),
            Some(_) => Some(Status::Paused),
            None => None,
        }
    }

    /// Whether the stored status agrees with the interval list.
    pub fn is_consistent(&self) -> bool {
        let open_count = self.stopwatch.iter().filter(|i| i.is_open()).count();
        let only_last_open = open_count == 0 || (open_count == 1 && self.open_interval().is_some());
        only_last_open && self.derived_status() == Some(self.status)
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running && self.open_interval().is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.status == Status::Paused
            && self.completed.is_none()
            && !self.stopwatch.is_empty()
            && self.stopwatch.iter().all(|i| !i.is_open())
    }

    /// Exact tracked time as of `now`.
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        duration::elapsed(&self.stopwatch, now)
    }

    /// Whether the entry carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    fn entry() -> TimeEntry {
        TimeEntry::new(
            Uid::new("uid-1").unwrap(),
            Alias::new("ab12").unwrap(),
            "write docs".to_string(),
            at(9, 0),
        )
    }

    fn predicates(entry: &TimeEntry) -> [bool; 3] {
        let last_open = entry.stopwatch.last().is_some_and(Interval::is_open);
        let any_open = entry.stopwatch.iter().any(Interval::is_open);
        [
            last_open,
            !entry.stopwatch.is_empty() && !last_open && entry.completed.is_none(),
            entry.completed.is_some() && !any_open,
        ]
    }

    #[test]
    fn new_entry_is_running_with_one_open_interval() {
        let entry = entry();
        assert_eq!(entry.status, Status::Running);
        assert_eq!(entry.stopwatch, vec![Interval::open(at(9, 0))]);
        assert_eq!(entry.started, Some(at(9, 0)));
        assert!(entry.is_consistent());
        assert!(entry.is_running());
    }

    #[test]
    fn exactly_one_state_predicate_holds() {
        let running = entry();
        let mut paused = entry();
        paused.stopwatch = vec![Interval::closed(at(9, 0), at(10, 0))];
        paused.status = Status::Paused;
        let mut stopped = paused.clone();
        stopped.completed = Some(at(10, 0));
        stopped.status = Status::Stopped;

        for entry in [running, paused, stopped] {
            let holding = predicates(&entry).iter().filter(|p| **p).count();
            assert_eq!(holding, 1, "{:?}", entry.status);
            assert!(entry.is_consistent());
        }
    }

    #[test]
    fn stale_status_is_inconsistent() {
        let mut entry = entry();
        entry.status = Status::Paused;
        assert_eq!(entry.derived_status(), Some(Status::Running));
        assert!(!entry.is_consistent());
        assert!(!entry.is_running());
        assert!(!entry.is_paused());
    }

    #[test]
    fn open_interval_before_the_last_is_inconsistent() {
        let mut entry = entry();
        entry.stopwatch.push(Interval::closed(at(10, 0), at(11, 0)));
        entry.status = Status::Paused;
        assert!(!entry.is_consistent());
    }

    #[test]
    fn negative_interval_counts_as_zero() {
        let interval = Interval::closed(at(10, 0), at(9, 0));
        assert_eq!(interval.length(at(12, 0)), Duration::zero());
    }

    #[test]
    fn deserializes_sparse_record_and_keeps_unknown_fields() {
        let json = r#"{
            "uid": "uid-9",
            "alias": "ZZ99",
            "description": "legacy",
            "status": "stopped",
            "created": "2025-03-10T09:00:00Z",
            "updated": "2025-03-10T10:00:00Z",
            "completed": "2025-03-10T10:00:00Z",
            "tags": null,
            "stopwatch": [{"start": "2025-03-10T09:00:00Z", "stop": "2025-03-10T10:00:00Z"}],
            "location": "office"
        }"#;
        let entry: TimeEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.alias.as_str(), "zz99");
        assert!(entry.tags.is_empty());
        assert_eq!(entry.project, None);
        assert_eq!(entry.extra.get("location"), Some(&Value::from("office")));
        assert!(entry.is_consistent());

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["location"], "office");
    }

    #[test]
    fn open_interval_omits_stop_when_serialized() {
        let json = serde_json::to_value(Interval::open(at(9, 0))).unwrap();
        assert_eq!(json, serde_json::json!({"start": "2025-03-10T09:00:00Z"}));
    }
}
