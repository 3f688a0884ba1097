//! CLI subcommand implementations.

use clap::Args;

pub mod delete;
pub mod info;
pub mod list;
pub mod modify;
pub mod notes;
pub mod query;
pub mod report;
pub mod start;
pub mod transition;
pub mod unset;
pub mod util;

/// Arguments for commands that act on a single entry.
#[derive(Debug, Args)]
pub struct IdArgs {
    /// Alias (or uid) of the entry.
    pub alias: String,
}
