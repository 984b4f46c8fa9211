//! Error types for the indexing core.
//!
//! All errors in the workspace are represented by the [`Error`] enum.
//! This keeps error handling composable across the parser, filter and batch crates.

use std::io;
use thiserror::Error as ThisError;

/// The core error type for all indexing operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Structural parse error from the markdown layer
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Match kind outside of `exact` / `prefix`
    #[error("Invalid match kind: {kind:?} (expected \"exact\" or \"prefix\")")]
    InvalidMatchKind { kind: String },

    /// Tag name that the recognizer would not accept
    #[error("Invalid tag: {tag:?}")]
    InvalidTag { tag: String },

    /// Malformed filter input
    #[error("Invalid filter: {reason}")]
    InvalidFilter { reason: String },

    /// Note missing from a store
    #[error("Note not found: {id}")]
    NoteNotFound { id: i32 },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create an invalid match kind error
    pub fn invalid_match_kind(kind: impl Into<String>) -> Self {
        Error::InvalidMatchKind { kind: kind.into() }
    }

    /// Create an invalid tag error
    pub fn invalid_tag(tag: impl Into<String>) -> Self {
        Error::InvalidTag { tag: tag.into() }
    }

    /// Create an invalid filter error
    pub fn invalid_filter(reason: impl Into<String>) -> Self {
        Error::InvalidFilter {
            reason: reason.into(),
        }
    }

    /// Create a note not found error
    pub fn note_not_found(id: i32) -> Self {
        Error::NoteNotFound { id }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::config_error(err.to_string())
    }
}
