//! Folio Storage - content-addressed blob storage client.
//!
//! Notebooks persist every version as an immutable blob on IPFS. This crate
//! provides the small storage surface the notebook logic needs:
//!
//! - **Upload**: store a text blob and get back its content identifier (CID)
//! - **Fetch**: resolve a CID to its body through an ordered list of gateways
//! - **List**: enumerate every blob uploaded under the account
//!
//! # Backends
//!
//! - [`LighthouseStore`] - the Lighthouse upload service plus public IPFS gateways
//! - [`MemoryStore`] - in-process store for tests and offline use
//!
//! # Example
//!
//! ```no_run
//! use folio_storage::{BlobStore, LighthouseConfig, LighthouseStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = LighthouseStore::new(LighthouseConfig::new("api-key"))?;
//!     let cid = store.upload("hello.md", "text/markdown", "# Hello".into()).await?;
//!     println!("{}", store.fetch(&cid).await?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod gateway;
pub mod lighthouse;
pub mod memory;
pub mod record;

pub use error::{Result, StorageError};
pub use gateway::{GatewayFetcher, DEFAULT_GATEWAYS};
pub use lighthouse::{LighthouseConfig, LighthouseStore};
pub use memory::MemoryStore;
pub use record::UploadRecord;

use async_trait::async_trait;

/// A content-addressed blob store.
///
/// Blobs are immutable: uploading returns the identifier the body is
/// addressable by, and nothing can be edited or removed afterwards.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload a text blob under a descriptive file name.
    ///
    /// Returns the content identifier of the stored blob.
    async fn upload(&self, file_name: &str, mime_type: &str, body: String) -> Result<String>;

    /// Fetch a blob body by content identifier.
    async fn fetch(&self, cid: &str) -> Result<String>;

    /// List every blob uploaded under the account.
    async fn list_uploads(&self) -> Result<Vec<UploadRecord>>;
}
