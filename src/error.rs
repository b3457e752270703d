//! Error types for docfeed library.

use std::io;
use thiserror::Error;

/// Result type alias for docfeed operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while rendering, caching or packing documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document id is unknown, of the wrong type, or outside the managed folder.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The document exists but the source refused access to it.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The document or listing collaborator failed.
    #[error("Source access failure: {0}")]
    SourceAccess(String),

    /// A serialized payload exceeds the ceiling of the target storage slot.
    #[error("Payload for '{key}' is {size} bytes (limit {limit})")]
    StorageOverflow {
        /// Storage key that was being written
        key: String,
        /// Measured payload size in bytes
        size: usize,
        /// Ceiling of the storage slot
        limit: usize,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error means the document cannot be served.
    ///
    /// Access failures are reported to callers exactly like unknown ids.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::AccessDenied(_) | Error::SourceAccess(_)
        )
    }
}
