//! Error types for storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur talking to the storage network.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The upload service rejected or failed the upload
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Every gateway in the fallback list failed to resolve the CID
    #[error("All {attempted} gateways failed to resolve {cid}")]
    AllGatewaysFailed { cid: String, attempted: usize },

    /// The account listing call failed
    #[error("Listing failed: {0}")]
    Listing(String),

    /// Blob not present (in-memory store only)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
