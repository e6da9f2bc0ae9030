//! Error types for kwest
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Hydration problems are deliberately absent: they are recovered inside the
//! persistence adapter and reported as a `HydrationOutcome`, never as an error.

use std::io;
use thiserror::Error;

/// Result type alias for kwest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the kwest state container
#[derive(Debug, Error)]
pub enum Error {
    /// Reverse lookup of an integer that is not registered in an `EnumRegistry`
    #[error("Invalid enum value: {0}")]
    InvalidEnumValue(i64),

    /// The same name was supplied twice when building an `EnumRegistry`
    #[error("Duplicate enum name: {0}")]
    DuplicateEnumName(String),

    /// The reducer was handed an action code it has no branch for
    #[error("Unknown action type: {0}")]
    UnknownActionType(i64),

    /// Codes assigned from the starting index run past `i64::MAX`
    #[error("Enum code for '{name}' overflows starting at {starting_index}")]
    EnumCodeOverflow {
        /// First name that has no representable code
        name: String,
        /// Starting index the registry was built with
        starting_index: i64,
    },

    /// Writing state back to the backend failed
    #[error("Failed to persist state under '{key}': {reason}")]
    PersistenceWriteFailure {
        /// Full storage key that was being written
        key: String,
        /// Backend or serializer message
        reason: String,
    },

    /// Key-value backend or cache store error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// The store's persistence writer has shut down
    #[error("Store is closed")]
    StoreClosed,
}

impl Error {
    /// Create a backend error from anything printable
    pub fn backend(msg: impl Into<String>) -> Self {
        Error::Backend(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// True for `UnknownActionType`
    pub fn is_unknown_action(&self) -> bool {
        matches!(self, Error::UnknownActionType(_))
    }

    /// True for `PersistenceWriteFailure`
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Error::PersistenceWriteFailure { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
