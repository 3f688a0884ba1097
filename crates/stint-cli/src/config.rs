//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use stint_core::RoundingPolicy;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// First day of the week for `thisweek` and `lastweek` reports.
    pub first_weekday: Weekday,

    /// Show `HH:MM:SS` instead of `HH:MM` in reports and lists.
    pub show_seconds: bool,

    /// Rounding applied to displayed durations.
    pub rounding: RoundingPolicy,

    /// Command used by `notes`; falls back to `$VISUAL`, then `$EDITOR`.
    #[serde(default)]
    pub editor: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("first_weekday", &self.first_weekday)
            .field("show_seconds", &self.show_seconds)
            .field("rounding", &self.rounding)
            .field("editor", &self.editor)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("stint.db"),
            first_weekday: Weekday::Sun,
            show_seconds: false,
            rounding: RoundingPolicy::default(),
            editor: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources override earlier ones: built-in defaults, the user
    /// config file, `config_path`, then `STINT_*` environment variables
    /// (`STINT_ROUNDING__METHOD=up` sets `rounding.method`).
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("STINT_").split("__"));

        figment.extract()
    }

    /// The editor command for `notes`.
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .filter(|command| !command.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string())
    }
}

/// Returns the platform-specific config directory for stint.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("stint"))
}

/// Returns the platform-specific data directory for stint.
///
/// On Linux: `~/.local/share/stint`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("stint"))
}
