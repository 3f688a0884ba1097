//! The command surface: load all entries, select, mutate one, save it.

use std::collections::HashSet;
use std::error::Error;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::editor::NotesEditor;
use crate::entry::TimeEntry;
use crate::filter::{Clause, SearchTerm};
use crate::lifecycle::{
    self, EntryError, Modification, TagUpdate, UnsetField, normalize_notes, normalize_project,
};
use crate::store::{EntryStore, LoadedEntries, SkippedRecord};
use crate::types::{Alias, Uid, ValidationError};

/// Attempts at drawing an unused random alias before giving up.
const ALIAS_ATTEMPTS: usize = 10_000;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Entry(#[from] EntryError),

    #[error("storage error: {0}")]
    Store(#[source] Box<dyn Error + Send + Sync>),

    #[error("editor failed: {0}")]
    Editor(#[source] Box<dyn Error + Send + Sync>),

    #[error("no free alias found after {attempts} attempts")]
    AliasesExhausted { attempts: usize },
}

impl From<ValidationError> for TrackerError {
    fn from(err: ValidationError) -> Self {
        Self::Entry(err.into())
    }
}

impl TrackerError {
    fn store(err: impl Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(err))
    }
}

/// Which entries `list` shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListView {
    /// Running and paused entries.
    #[default]
    All,
    Running,
    Paused,
}

impl ListView {
    pub fn search_term(self) -> SearchTerm {
        let statuses: &[&str] = match self {
            Self::All => &["running", "paused"],
            Self::Running => &["running"],
            Self::Paused => &["paused"],
        };
        SearchTerm {
            include: vec![Clause::Status(
                statuses.iter().map(ToString::to_string).collect(),
            )],
            exclude: Vec::new(),
        }
    }
}

/// Arguments to [`Tracker::start`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartRequest {
    pub description: String,
    pub project: Option<String>,
    pub tags: Vec<String>,
    /// Start time; defaults to `now`.
    pub at: Option<DateTime<Utc>>,
}

/// All entries of a store, loaded once.
pub struct Tracker<S> {
    store: S,
    entries: Vec<TimeEntry>,
    skipped: Vec<SkippedRecord>,
}

impl<S: EntryStore> Tracker<S> {
    pub fn load(store: S) -> Result<Self, TrackerError> {
        let mut tracker = Self {
            store,
            entries: Vec::new(),
            skipped: Vec::new(),
        };
        tracker.refresh()?;
        Ok(tracker)
    }

    /// Reloads every entry from the store.
    pub fn refresh(&mut self) -> Result<(), TrackerError> {
        let LoadedEntries {
            entries,
            mut skipped,
        } = self.store.load_all().map_err(TrackerError::store)?;

        let mut uids = HashSet::new();
        let mut aliases = HashSet::new();
        let mut kept = Vec::with_capacity(entries.len());
        for entry in entries {
            if !uids.insert(entry.uid.clone()) {
                skipped.push(SkippedRecord::new(entry.uid.as_str(), "duplicate uid"));
                continue;
            }
            if !aliases.insert(entry.alias.clone()) {
                skipped.push(SkippedRecord::new(
                    entry.uid.as_str(),
                    format!("duplicate alias '{}'", entry.alias),
                ));
                continue;
            }
            if !entry.is_consistent() {
                warn!(
                    alias = %entry.alias,
                    status = %entry.status,
                    "entry status disagrees with its intervals"
                );
            }
            kept.push(entry);
        }
        for record in &skipped {
            warn!(record = %record.id, reason = %record.reason, "skipped record");
        }
        kept.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.uid.cmp(&b.uid)));

        debug!(entries = kept.len(), skipped = skipped.len(), "loaded entries");
        self.entries = kept;
        self.skipped = skipped;
        Ok(())
    }

    /// Loaded entries, oldest first.
    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    /// Records the last load had to skip.
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn position(&self, id: &str) -> Result<usize, EntryError> {
        let id = id.trim();
        let alias = id.to_lowercase();
        self.entries
            .iter()
            .position(|entry| entry.alias.as_str() == alias || entry.uid.as_str() == id)
            .ok_or_else(|| EntryError::NotFound { id: id.to_string() })
    }

    /// Looks up an entry by alias (case-insensitive) or uid.
    pub fn find(&self, id: &str) -> Result<&TimeEntry, EntryError> {
        self.position(id).map(|index| &self.entries[index])
    }

    /// Entries matching `term`, oldest first.
    pub fn select(&self, term: &SearchTerm) -> Vec<&TimeEntry> {
        let selected = term.select(&self.entries);
        debug!(matched = selected.len(), "selected entries");
        selected
    }

    pub fn list(&self, view: ListView) -> Vec<&TimeEntry> {
        self.select(&view.search_term())
    }

    /// Creates and saves a running entry with a fresh uid and alias.
    pub fn start(
        &mut self,
        request: StartRequest,
        now: DateTime<Utc>,
    ) -> Result<&TimeEntry, TrackerError> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(ValidationError::Empty {
                field: "description",
            }
            .into());
        }
        let project = request
            .project
            .as_deref()
            .map(normalize_project)
            .transpose()?;

        let mut entry = TimeEntry::new(
            Uid::generate(),
            self.free_alias()?,
            description.to_string(),
            request.at.unwrap_or(now),
        );
        entry.project = project;
        TagUpdate::Replace(request.tags.iter().map(|t| t.trim().to_lowercase()).collect())
            .apply(&mut entry.tags);
        entry.tags.retain(|tag| !tag.is_empty());
        entry.created = now;
        entry.updated = now;

        self.store.save(&entry).map_err(TrackerError::store)?;
        info!(alias = %entry.alias, uid = %entry.uid, "started entry");
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    fn free_alias(&self) -> Result<Alias, TrackerError> {
        let taken: HashSet<&Alias> = self.entries.iter().map(|entry| &entry.alias).collect();
        let mut rng = rand::thread_rng();
        (0..ALIAS_ATTEMPTS)
            .map(|_| Alias::random(&mut rng))
            .find(|alias| !taken.contains(alias))
            .ok_or(TrackerError::AliasesExhausted {
                attempts: ALIAS_ATTEMPTS,
            })
    }

    /// Applies `change` to a copy of the entry, saves it, then commits it in
    /// memory.
    fn mutate<F>(
        &mut self,
        id: &str,
        operation: &'static str,
        change: F,
    ) -> Result<&TimeEntry, TrackerError>
    where
        F: FnOnce(&mut TimeEntry) -> Result<(), EntryError>,
    {
        let index = self.position(id)?;
        let mut entry = self.entries[index].clone();
        change(&mut entry)?;

        self.store.save(&entry).map_err(TrackerError::store)?;
        info!(alias = %entry.alias, operation, status = %entry.status, "saved entry");
        self.entries[index] = entry;
        Ok(&self.entries[index])
    }

    pub fn pause(&mut self, id: &str, now: DateTime<Utc>) -> Result<&TimeEntry, TrackerError> {
        self.mutate(id, "pause", |entry| lifecycle::pause(entry, now))
    }

    pub fn resume(&mut self, id: &str, now: DateTime<Utc>) -> Result<&TimeEntry, TrackerError> {
        self.mutate(id, "resume", |entry| lifecycle::resume(entry, now))
    }

    pub fn stop(&mut self, id: &str, now: DateTime<Utc>) -> Result<&TimeEntry, TrackerError> {
        self.mutate(id, "stop", |entry| lifecycle::stop(entry, now))
    }

    pub fn modify(
        &mut self,
        id: &str,
        change: &Modification,
        now: DateTime<Utc>,
    ) -> Result<&TimeEntry, TrackerError> {
        self.mutate(id, "modify", |entry| lifecycle::modify(entry, change, now))
    }

    pub fn unset(
        &mut self,
        id: &str,
        field: UnsetField,
        now: DateTime<Utc>,
    ) -> Result<&TimeEntry, TrackerError> {
        self.mutate(id, "unset", |entry| {
            lifecycle::unset(entry, field, now);
            Ok(())
        })
    }

    /// Opens the entry's notes in `editor` and saves the result. Blank text
    /// clears the notes.
    pub fn edit_notes<E: NotesEditor>(
        &mut self,
        id: &str,
        editor: &E,
        now: DateTime<Utc>,
    ) -> Result<&TimeEntry, TrackerError> {
        let current = self.find(id)?.notes.clone().unwrap_or_default();
        let edited = editor
            .edit(&current)
            .map_err(|err| TrackerError::Editor(Box::new(err)))?;
        self.mutate(id, "notes", |entry| {
            entry.notes = normalize_notes(&edited);
            entry.updated = now;
            Ok(())
        })
    }

    /// Removes the entry from the store and returns it.
    pub fn delete(&mut self, id: &str) -> Result<TimeEntry, TrackerError> {
        let index = self.position(id)?;
        self.store
            .remove(&self.entries[index].uid)
            .map_err(TrackerError::store)?;
        let entry = self.entries.remove(index);
        info!(alias = %entry.alias, uid = %entry.uid, "deleted entry");
        Ok(entry)
    }
}
