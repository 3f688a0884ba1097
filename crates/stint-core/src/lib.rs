//! Core domain logic for stint.
//!
//! This crate contains the entry model and everything that works on it
//! without touching the outside world:
//! - Lifecycle: running/paused/stopped transitions and interval bookkeeping
//! - Durations: elapsed time and presentation-time rounding
//! - Filtering: the search-term language and named report windows
//! - Output: time reports, lists, the info view and query projections
//! - Tracker: the command surface over any [`EntryStore`]

pub mod duration;
pub mod editor;
pub mod entry;
pub mod filter;
pub mod lifecycle;
pub mod query;
pub mod report;
pub mod store;
pub mod tracker;
pub mod types;
pub mod window;

pub use duration::{RoundingInterval, RoundingMethod, RoundingPolicy, Totals, format_clock};
pub use editor::NotesEditor;
pub use entry::{Interval, TimeEntry};
pub use filter::{Clause, FilterError, SearchTerm};
pub use lifecycle::{EntryError, Modification, TagUpdate, UnsetField};
pub use query::{FieldLimit, QueryError, QueryField};
pub use store::{EntryStore, LoadedEntries, SkippedRecord};
pub use tracker::{ListView, StartRequest, Tracker, TrackerError};
pub use types::{Alias, Status, Uid, ValidationError};
pub use window::{ReportTerm, Window};
