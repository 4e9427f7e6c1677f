//! Notebook models.
//!
//! # Core Types
//!
//! - [`NotebookMetadata`] - one revision of a notebook's metadata blob
//! - [`NotebookVersion`] - one saved version of the notebook content
//!
//! Timestamps are kept as ISO 8601 strings exactly as they appear on the
//! wire; [`timestamp`] handles producing and ordering them.

mod notebook;
pub mod timestamp;
mod version;

pub use notebook::NotebookMetadata;
pub use version::{NotebookVersion, PREVIEW_CHARS, PREVIEW_MARKER};
