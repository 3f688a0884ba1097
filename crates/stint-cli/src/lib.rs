//! Terminal time tracker CLI library.
//!
//! Argument parsing, configuration and the subcommands of `stint`.

mod cli;
pub mod commands;
mod config;
pub mod editor;

pub use cli::{Cli, Commands};
pub use config::Config;
