//! Folio Notebook - versioned research notebooks on IPFS.
//!
//! A notebook is a titled, author-owned, append-only sequence of markdown
//! versions. Every save uploads the content as an immutable blob, then
//! uploads a fresh metadata blob chaining all versions so far. Notebooks by
//! any author are discovered by scanning the account's uploads.
//!
//! # Architecture
//!
//! - **Models**: [`NotebookMetadata`], [`NotebookVersion`] and their wire format
//! - **Versioning**: building and chaining versions ([`append_version`])
//! - **Discovery**: finding metadata blobs among all uploads ([`list_all_notebooks`])
//! - **Session**: persisted address / open notebook ([`SessionStore`], [`Identity`])
//! - **API**: HTTP endpoints for browser clients
//!
//! # Example
//!
//! ```no_run
//! use folio_notebook::{append_version, list_all_notebooks, NewVersion};
//! use folio_storage::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     let draft = NewVersion::new("# Day 1", "0xabc", "Lab notes");
//!     draft.validate()?;
//!     let saved = append_version(&store, &draft, None).await?;
//!     println!("saved {} as {}", saved.metadata.notebook_id, saved.metadata_cid);
//!     assert_eq!(list_all_notebooks(&store).await.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod discovery;
pub mod error;
pub mod identity;
pub mod models;
pub mod node;
pub mod session;
pub mod versioning;

pub use discovery::{
    list_all_notebooks, notebook_by_id, notebooks_by_author, scan_notebooks, Discovery,
    SkipReason, Skipped,
};
pub use error::{Error, Result};
pub use identity::Identity;
pub use models::{NotebookMetadata, NotebookVersion};
pub use node::{FolioConfig, FolioNode};
pub use session::SessionStore;
pub use versioning::{
    append_version, append_version_at, load_metadata, load_version_content, NewVersion,
    SavedNotebook,
};
