//! Error types for store operations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::value::ValueKind;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// The key is empty or contains an empty segment.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// A write was attempted with a null value.
    #[error("value for key {key:?} must not be null")]
    MissingValue { key: String },

    /// A segment that the operation requires to exist is missing.
    #[error("key not found: {key} (missing segment {segment:?})")]
    KeyNotFound { key: String, segment: String },

    /// A segment holds a value of the wrong type for the operation.
    #[error("type mismatch at {segment:?} in {key}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        segment: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// The persisted document is not valid JSON.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The persisted document is valid JSON but its root is not an object.
    #[error("document root in {} must be an object, found {found}", path.display())]
    NotAnObject { path: PathBuf, found: ValueKind },

    /// Typed conversion to or from a JSON value failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A backend lock was poisoned by a panicking holder.
    #[error("backend lock poisoned: {0}")]
    Poisoned(String),

    /// I/O error while reading or writing the backing file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error categories, one per failure class callers usually branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller misuse: bad key or null value.
    Key,
    /// A required path segment is missing.
    NotFound,
    /// A segment or terminal value has an incompatible type.
    TypeMismatch,
    /// On-disk content is not a valid document.
    Parse,
    /// File creation, read or write failure.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Key => "key error",
            ErrorKind::NotFound => "key not found",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::Parse => "parse error",
            ErrorKind::Io => "io error",
        };
        f.write_str(name)
    }
}

impl DbError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::InvalidKey { .. } | DbError::MissingValue { .. } => ErrorKind::Key,
            DbError::KeyNotFound { .. } => ErrorKind::NotFound,
            DbError::TypeMismatch { .. } | DbError::Serialization(_) => ErrorKind::TypeMismatch,
            DbError::Parse { .. } | DbError::NotAnObject { .. } => ErrorKind::Parse,
            DbError::Io(_) | DbError::Poisoned(_) => ErrorKind::Io,
        }
    }
}

/// Convenience type alias for store operations.
pub type DbResult<T> = std::result::Result<T, DbError>;
