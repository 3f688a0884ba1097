//! SQLite storage for stint time entries.
//!
//! Each entry is one row of the `entries` table. The `data` column holds the
//! full JSON record, so fields this version does not know about survive a
//! load/save cycle. `alias` and `updated_at` are copied out of the record for
//! inspection with the `sqlite3` shell; they are never read back.
//!
//! Timestamps are stored as RFC 3339 text in UTC
//! (e.g. `2025-03-10T09:00:00.000Z`).

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use stint_core::{EntryStore, LoadedEntries, SkippedRecord, TimeEntry, Uid};
use thiserror::Error;
use tracing::debug;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// An entry could not be encoded as JSON.
    #[error("failed to encode entry {uid}: {source}")]
    Encode {
        uid: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A connection to the entry database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is initialized on first open.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Opens an in-memory database, destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Idempotent.
    fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS entries (
                uid TEXT PRIMARY KEY,
                alias TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                data TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_entries_alias ON entries(alias);
            ",
        )?;
        Ok(())
    }

    /// Reads every row. Rows whose JSON does not parse are reported as
    /// skipped.
    pub fn load_all(&self) -> Result<LoadedEntries, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT uid, data FROM entries ORDER BY uid ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut loaded = LoadedEntries::default();
        for row in rows {
            let (uid, data) = row?;
            match serde_json::from_str::<TimeEntry>(&data) {
                Ok(entry) if entry.uid.as_str() == uid => loaded.entries.push(entry),
                Ok(entry) => loaded.skipped.push(SkippedRecord::new(
                    uid,
                    format!("record carries mismatched uid '{}'", entry.uid),
                )),
                Err(err) => loaded.skipped.push(SkippedRecord::new(uid, err.to_string())),
            }
        }
        Ok(loaded)
    }

    /// Inserts or replaces the row for `entry.uid`.
    pub fn save(&self, entry: &TimeEntry) -> Result<(), StoreError> {
        let data = serde_json::to_string(entry).map_err(|source| StoreError::Encode {
            uid: entry.uid.to_string(),
            source,
        })?;
        self.conn.execute(
            "
            INSERT INTO entries (uid, alias, updated_at, data)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(uid) DO UPDATE SET
                alias = excluded.alias,
                updated_at = excluded.updated_at,
                data = excluded.data
            ",
            params![
                entry.uid.as_str(),
                entry.alias.as_str(),
                format_timestamp(entry.updated),
                data
            ],
        )?;
        Ok(())
    }

    /// Deletes the row for `uid`. Deleting a missing row is not an error.
    pub fn remove(&self, uid: &Uid) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM entries WHERE uid = ?1", [uid.as_str()])?;
        Ok(())
    }
}

impl EntryStore for Database {
    type Error = StoreError;

    fn load_all(&self) -> Result<LoadedEntries, Self::Error> {
        Self::load_all(self)
    }

    fn save(&mut self, entry: &TimeEntry) -> Result<(), Self::Error> {
        Self::save(self, entry)
    }

    fn remove(&mut self, uid: &Uid) -> Result<(), Self::Error> {
        Self::remove(self, uid)
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
