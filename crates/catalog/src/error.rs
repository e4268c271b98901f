//! Error types for the catalog crate.
//!
//! Loading a snapshot can fail on I/O, on malformed JSON, or on a record
//! that cannot be turned into a `CatalogEvent`. Everything downstream of a
//! loaded snapshot is infallible with respect to catalog data.

use thiserror::Error;

/// Errors that can occur while loading or validating a catalog snapshot
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The document as a whole is not valid JSON (or has the wrong shape)
    #[error("Malformed JSON in {file}: {source}")]
    JsonError {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A single record in the document couldn't be parsed
    #[error("Parse error at record {index} in {file}: {reason}")]
    ParseError {
        file: String,
        index: usize,
        reason: String,
    },

    /// Two records share the same event id
    #[error("Duplicate event id {id} in catalog")]
    DuplicateId { id: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
