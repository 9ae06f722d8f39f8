//! Error types for the catalog crate.
//!
//! Two families live here:
//! - `DataLoadError` for reading and validating the flat-file snapshot
//! - `StoreError` for lookups against a loaded catalog/behavior store

use crate::types::{SongId, UserId};
use thiserror::Error;

/// Errors that can occur while loading and parsing the catalog snapshot
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an out-of-range value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line} of {file}")]
    FieldCountMismatch {
        file: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    /// Referenced entity doesn't exist (e.g., a like from an unknown user)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },
}

/// Convenience type alias for loader results
pub type Result<T> = std::result::Result<T, DataLoadError>;

/// Errors surfaced by `CatalogStore` / `UserBehaviorStore` lookups.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Song {0} not found")]
    SongNotFound(SongId),

    #[error("User {0} not found")]
    UserNotFound(UserId),

    /// The backing store failed (unreachable, timed out, corrupted row...)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
