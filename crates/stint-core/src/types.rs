//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Invalid entry status value.
    #[error("invalid status '{value}': expected running, paused or stopped")]
    InvalidStatus { value: String },

    /// Alias contained characters outside `[a-z0-9]`.
    #[error("invalid alias '{value}': only letters and digits are allowed")]
    InvalidAlias { value: String },
}

/// Lifecycle state of a time entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The clock is running: the last interval is open.
    Running,
    /// The clock is paused: every interval is closed and the entry is not completed.
    Paused,
    /// The entry is completed.
    Stopped,
}

impl Status {
    /// String representation for storage and filtering.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "paused" => Ok(Self::Paused),
            "stopped" => Ok(Self::Stopped),
            _ => Err(ValidationError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal, $normalize:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                let id = id.trim();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                let normalize: fn(&str) -> Result<String, ValidationError> = $normalize;
                Ok(Self(normalize(id)?))
            }
        }
    };
}

define_string_id!(
    /// A globally unique entry identifier.
    ///
    /// New entries get a v4 UUID; identifiers loaded from storage are accepted
    /// as-is as long as they are non-empty.
    Uid, "uid", |id| Ok(id.to_string())
);

define_string_id!(
    /// A short, user-facing entry identifier.
    ///
    /// Aliases are case-insensitive and stored lowercase.
    Alias, "alias", |id| {
        if id.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(id.to_ascii_lowercase())
        } else {
            Err(ValidationError::InvalidAlias { value: id.to_string() })
        }
    }
);

/// Number of characters in a generated alias.
pub const ALIAS_LEN: usize = 4;

const ALIAS_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

impl Uid {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Alias {
    /// Draws a random alias of [`ALIAS_LEN`] characters from `[a-z0-9]`.
    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let alias = (0..ALIAS_LEN)
            .map(|_| char::from(ALIAS_CHARS[rng.gen_range(0..ALIAS_CHARS.len())]))
            .collect();
        Self(alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_rejects_empty() {
        assert!(Uid::new("").is_err());
        assert!(Uid::new("   ").is_err());
        assert!(Uid::new("4b1e0c2a").is_ok());
    }

    #[test]
    fn generated_uids_are_distinct() {
        assert_ne!(Uid::generate(), Uid::generate());
    }

    #[test]
    fn alias_is_lowercased() {
        let alias = Alias::new("AB12").unwrap();
        assert_eq!(alias.as_str(), "ab12");
    }

    #[test]
    fn alias_rejects_punctuation() {
        assert_eq!(
            Alias::new("ab-1"),
            Err(ValidationError::InvalidAlias {
                value: "ab-1".to_string()
            })
        );
    }

    #[test]
    fn random_alias_has_expected_shape() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let alias = Alias::random(&mut rng);
            assert_eq!(alias.as_str().len(), ALIAS_LEN);
            assert!(
                alias
                    .as_str()
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn alias_serde_rejects_empty() {
        let result: Result<Alias, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn status_from_str() {
        assert_eq!("running".parse::<Status>().unwrap(), Status::Running);
        assert_eq!("Paused".parse::<Status>().unwrap(), Status::Paused);
        assert_eq!(" stopped ".parse::<Status>().unwrap(), Status::Stopped);
        assert!("done".parse::<Status>().is_err());
    }

    #[test]
    fn status_serde_roundtrip() {
        let json = serde_json::to_string(&Status::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
        let parsed: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Status::Paused);
    }
}
