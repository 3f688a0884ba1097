//! The persistence contract the tracker works against.

use std::error::Error;
use std::fmt;

use crate::entry::TimeEntry;
use crate::types::Uid;

/// A stored record that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// The record's key, or the entry uid when the record itself parsed.
    pub id: String,
    pub reason: String,
}

impl SkippedRecord {
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped record '{}': {}", self.id, self.reason)
    }
}

/// Everything a store could read, plus what it had to skip.
#[derive(Debug, Clone, Default)]
pub struct LoadedEntries {
    pub entries: Vec<TimeEntry>,
    pub skipped: Vec<SkippedRecord>,
}

/// One record per entry, keyed by uid.
///
/// A failure to read a single record is reported in
/// [`LoadedEntries::skipped`], not as an error.
pub trait EntryStore {
    type Error: Error + Send + Sync + 'static;

    fn load_all(&self) -> Result<LoadedEntries, Self::Error>;

    /// Inserts or replaces the record for `entry.uid`.
    fn save(&mut self, entry: &TimeEntry) -> Result<(), Self::Error>;

    fn remove(&mut self, uid: &Uid) -> Result<(), Self::Error>;
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::BTreeMap;
    use std::convert::Infallible;

    use super::*;

    /// Raw JSON records in memory.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        pub records: BTreeMap<String, String>,
        pub saves: usize,
    }

    impl EntryStore for MemoryStore {
        type Error = Infallible;

        fn load_all(&self) -> Result<LoadedEntries, Self::Error> {
            let mut loaded = LoadedEntries::default();
            for (key, json) in &self.records {
                match serde_json::from_str(json) {
                    Ok(entry) => loaded.entries.push(entry),
                    Err(err) => loaded.skipped.push(SkippedRecord::new(key, err.to_string())),
                }
            }
            Ok(loaded)
        }

        fn save(&mut self, entry: &TimeEntry) -> Result<(), Self::Error> {
            let json = serde_json::to_string(entry).unwrap();
            self.records.insert(entry.uid.to_string(), json);
            self.saves += 1;
            Ok(())
        }

        fn remove(&mut self, uid: &Uid) -> Result<(), Self::Error> {
            self.records.remove(uid.as_str());
            Ok(())
        }
    }
}
