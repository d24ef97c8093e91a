//! Database namespaces.
//!
//! The application uses two isolated logical databases: one for production
//! and one for development. Names are validated against the engine's
//! database naming rules before anything is sent over the wire.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Characters the engine rejects in database names.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '.', ' ', '"', '$', '*', '<', '>', ':', '|', '?', '\0'];

/// Errors that can occur when parsing a [`Namespace`] or [`NamespaceKind`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// The name is empty.
    #[error("namespace name cannot be empty")]
    Empty,
    /// The name is too long.
    #[error("namespace name must be shorter than {max} bytes")]
    TooLong {
        /// Exclusive byte limit.
        max: usize,
    },
    /// The name contains a forbidden character.
    #[error("namespace name contains forbidden character {0:?}")]
    ForbiddenChar(char),
    /// Unknown namespace kind.
    #[error("unknown namespace kind: {0} (expected production or development)")]
    UnknownKind(String),
}

/// A validated database name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Exclusive upper bound on the name length in bytes.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, 64 bytes or longer, or
    /// contains a character the engine forbids.
    pub fn parse(s: &str) -> Result<Self, NamespaceError> {
        if s.is_empty() {
            return Err(NamespaceError::Empty);
        }
        if s.len() >= Self::MAX_LENGTH {
            return Err(NamespaceError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if let Some(bad) = s.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
            return Err(NamespaceError::ForbiddenChar(bad));
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which of the two application namespaces a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceKind {
    Production,
    #[default]
    Development,
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
        }
    }
}

impl std::str::FromStr for NamespaceKind {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(NamespaceError::UnknownKind(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_application_namespaces() {
        assert!(Namespace::parse("video_streaming").is_ok());
        assert!(Namespace::parse("video_streaming_dev").is_ok());
    }

    #[test]
    fn test_parse_rejects_engine_forbidden_names() {
        assert_eq!(Namespace::parse(""), Err(NamespaceError::Empty));
        assert_eq!(
            Namespace::parse("video.streaming"),
            Err(NamespaceError::ForbiddenChar('.'))
        );
        assert_eq!(
            Namespace::parse("video streaming"),
            Err(NamespaceError::ForbiddenChar(' '))
        );
        assert!(matches!(
            Namespace::parse(&"v".repeat(64)),
            Err(NamespaceError::TooLong { .. })
        ));
        assert!(Namespace::parse(&"v".repeat(63)).is_ok());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("production".parse(), Ok(NamespaceKind::Production));
        assert_eq!("DEV".parse(), Ok(NamespaceKind::Development));
        assert!("staging".parse::<NamespaceKind>().is_err());
    }

    #[test]
    fn test_kind_defaults_to_development() {
        assert_eq!(NamespaceKind::default(), NamespaceKind::Development);
    }
}
