//! Error types for notebook operations.

use folio_storage::StorageError;
use thiserror::Error;

/// Result type for notebook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notebook operations.
///
/// Storage failures are split by what was being attempted, since callers
/// react differently to a failed save, a failed load and a failed listing.
#[derive(Debug, Error)]
pub enum Error {
    /// An upload failed; nothing from the save should be assumed persisted
    #[error("Storage write failed: {0}")]
    StorageWrite(StorageError),

    /// Retrieval failed on every gateway
    #[error("Storage read failed: {0}")]
    StorageRead(StorageError),

    /// Enumerating the account's uploads failed
    #[error("Listing failed: {0}")]
    Listing(StorageError),

    /// A blob was not valid notebook metadata
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller may not modify this notebook
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session store error
    #[error("Session store error: {0}")]
    Session(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(e: rocksdb::Error) -> Self {
        Error::Session(e.to_string())
    }
}
