//! Building and chaining notebook versions.
//!
//! A save is two uploads: the raw markdown content, then the full metadata
//! with the new version appended. Either upload failing aborts the save.
//! The previous metadata is never touched; its blob simply stops being the
//! newest one.

use crate::discovery;
use crate::error::{Error, Result};
use crate::models::{timestamp, NotebookMetadata, NotebookVersion};
use chrono::{DateTime, Utc};
use folio_storage::BlobStore;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Media type content blobs are uploaded with.
pub const CONTENT_MIME: &str = "text/markdown";

/// Media type metadata blobs are uploaded with.
pub const METADATA_MIME: &str = "application/json";

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_RANDOM_LEN: usize = 9;

/// A version about to be saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVersion {
    /// Markdown body
    pub content: String,
    /// Saving account address
    pub author: String,
    /// Notebook title (a save may retitle the notebook)
    pub title: String,
}

impl NewVersion {
    pub fn new(
        content: impl Into<String>,
        author: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
            title: title.into(),
        }
    }

    /// Check the draft is saveable. Callers run this before
    /// [`append_version`], which does not check again.
    pub fn validate(&self) -> Result<()> {
        if self.author.trim().is_empty() {
            return Err(Error::InvalidInput("no author address".into()));
        }
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("title is empty".into()));
        }
        if self.content.trim().is_empty() {
            return Err(Error::InvalidInput("content is empty".into()));
        }
        Ok(())
    }

    /// Check the draft's author owns `existing`. Only the author may
    /// append to a notebook; anyone else has to start their own.
    pub fn check_author(&self, existing: &NotebookMetadata) -> Result<()> {
        if existing.is_authored_by(&self.author) {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "{} is owned by {}",
                existing.notebook_id, existing.author
            )))
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedNotebook {
    /// The new metadata
    pub metadata: NotebookMetadata,
    /// CID of the uploaded content blob
    pub content_cid: String,
    /// CID of the uploaded metadata blob
    pub metadata_cid: String,
}

/// Save a new version, creating the notebook if `existing` is `None`.
pub async fn append_version(
    store: &dyn BlobStore,
    draft: &NewVersion,
    existing: Option<&NotebookMetadata>,
) -> Result<SavedNotebook> {
    append_version_at(store, draft, existing, Utc::now()).await
}

/// [`append_version`] with an explicit clock.
pub async fn append_version_at(
    store: &dyn BlobStore,
    draft: &NewVersion,
    existing: Option<&NotebookMetadata>,
    now: DateTime<Utc>,
) -> Result<SavedNotebook> {
    let number = existing.map_or(1, NotebookMetadata::next_version_number);

    let content_cid = store
        .upload(
            &content_file_name(&draft.title, number),
            CONTENT_MIME,
            draft.content.clone(),
        )
        .await
        .map_err(Error::StorageWrite)?;

    let stamp = timestamp::format(now);
    let version = NotebookVersion::new(content_cid.clone(), number, &draft.content, stamp.clone());

    let mut versions = existing.map(|m| m.versions.clone()).unwrap_or_default();
    versions.push(version);

    let notebook_id = existing
        .map(|m| m.notebook_id.clone())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(generate_notebook_id);
    let created_at = existing
        .map(|m| m.created_at.clone())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| stamp.clone());

    let metadata = NotebookMetadata {
        notebook_id,
        author: draft.author.clone(),
        title: draft.title.clone(),
        versions,
        created_at,
        updated_at: stamp,
    };

    let metadata_cid = store
        .upload(&metadata.metadata_file_name(), METADATA_MIME, metadata.to_wire()?)
        .await
        .map_err(Error::StorageWrite)?;

    tracing::info!("Notebook content uploaded with CID: {}", content_cid);
    tracing::info!(
        "Notebook {} v{} metadata uploaded with CID: {}",
        metadata.notebook_id,
        number,
        metadata_cid
    );

    Ok(SavedNotebook {
        metadata,
        content_cid,
        metadata_cid,
    })
}

/// Fetch the content of one version.
pub async fn load_version_content(
    store: &dyn BlobStore,
    metadata: &NotebookMetadata,
    number: u32,
) -> Result<String> {
    let version = metadata.version(number).ok_or_else(|| {
        Error::NotFound(format!("{} v{}", metadata.notebook_id, number))
    })?;
    store
        .fetch(&version.content_id)
        .await
        .map_err(Error::StorageRead)
}

/// Fetch and validate a metadata blob by CID.
pub async fn load_metadata(store: &dyn BlobStore, cid: &str) -> Result<NotebookMetadata> {
    let body = store.fetch(cid).await.map_err(Error::StorageRead)?;
    discovery::parse_metadata(&body).map_err(|reason| Error::Validation(reason.to_string()))
}

/// Content blob file name: `<title with non-alphanumerics as _>_v<n>.md`.
pub fn content_file_name(title: &str, version: u32) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_v{}.md", stem, version)
}

/// Fresh notebook id: `notebook_<unix millis>_<9 random base-36 chars>`.
pub fn generate_notebook_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_RANDOM_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("notebook_{}_{}", Utc::now().timestamp_millis(), suffix)
}
