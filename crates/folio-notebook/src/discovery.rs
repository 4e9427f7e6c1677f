//! Notebook discovery.
//!
//! There is no index: every listing scans all uploads on the account,
//! skipping blobs that are obviously content, fetching the rest and keeping
//! those that parse as notebook metadata. Anything else is skipped silently
//! so one user's unrelated blobs never break discovery for everyone.
//!
//! Each upload is classified into a [`Candidate`], so skip reasons stay
//! observable through [`scan_notebooks`] while [`list_all_notebooks`] only
//! returns the notebooks.

use crate::error::{Error, Result};
use crate::models::NotebookMetadata;
use folio_storage::{BlobStore, UploadRecord};
use std::collections::HashMap;
use std::fmt;

/// Media type marking a blob as notebook content.
pub const MARKDOWN_MIME: &str = "text/markdown";

/// Why an upload was not treated as notebook metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// File name follows the content blob convention
    ContentFileName,
    /// Declared media type is markdown
    MarkdownMimeType,
    /// Body could not be retrieved
    FetchFailed(String),
    /// Body does not start with `{`
    NotJsonObject,
    /// Body is not valid JSON
    InvalidJson(String),
    /// `notebook_id`, `author` or `versions` missing or empty
    MissingFields,
    /// Required fields present but some field has the wrong shape
    Malformed(String),
    /// An up-to-date metadata blob for the same notebook exists
    Superseded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ContentFileName => write!(f, "content file name"),
            SkipReason::MarkdownMimeType => write!(f, "markdown media type"),
            SkipReason::FetchFailed(e) => write!(f, "fetch failed: {}", e),
            SkipReason::NotJsonObject => write!(f, "not a JSON object"),
            SkipReason::InvalidJson(e) => write!(f, "invalid JSON: {}", e),
            SkipReason::MissingFields => write!(f, "not notebook metadata"),
            SkipReason::Malformed(e) => write!(f, "malformed metadata: {}", e),
            SkipReason::Superseded => write!(f, "superseded by a newer revision"),
        }
    }
}

/// An upload that was not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub cid: String,
    pub file_name: Option<String>,
    pub reason: SkipReason,
}

/// Outcome of examining one upload.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Notebook(NotebookMetadata),
    Skipped(SkipReason),
}

/// Result of a full scan.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Notebooks, newest first, one per `notebook_id`
    pub notebooks: Vec<NotebookMetadata>,
    /// Metadata blob CID for each kept notebook, by `notebook_id`
    pub metadata_cids: HashMap<String, String>,
    /// Everything else
    pub skipped: Vec<Skipped>,
}

/// Whether a file name follows the content blob convention
/// (`.md` suffix, or a stem ending in `_v<digits>`). `.json` names never
/// count, since generated notebook ids may end in `_v<digits>` themselves.
pub fn is_content_file_name(name: &str) -> bool {
    if name.ends_with(".md") {
        return true;
    }
    if name.to_ascii_lowercase().ends_with(".json") {
        return false;
    }
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    match stem.rsplit_once("_v") {
        Some((_, digits)) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Cheap checks on the listing entry alone, before any fetch.
///
/// This is a heuristic: a metadata blob uploaded under a content-looking
/// name is skipped and never found.
pub fn prefilter(record: &UploadRecord) -> Option<SkipReason> {
    if record.file_name.as_deref().is_some_and(is_content_file_name) {
        return Some(SkipReason::ContentFileName);
    }
    if record
        .mime_type
        .as_deref()
        .is_some_and(|m| m.eq_ignore_ascii_case(MARKDOWN_MIME))
    {
        return Some(SkipReason::MarkdownMimeType);
    }
    None
}

/// Parse and validate a blob body as notebook metadata.
pub fn parse_metadata(body: &str) -> std::result::Result<NotebookMetadata, SkipReason> {
    if !body.trim_start().starts_with('{') {
        return Err(SkipReason::NotJsonObject);
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| SkipReason::InvalidJson(e.to_string()))?;

    let non_empty = |key: &str| {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .is_some_and(|s| !s.is_empty())
    };
    let has_versions = value.get("versions").is_some_and(|v| v.is_array());
    if !(non_empty("notebook_id") && non_empty("author") && has_versions) {
        return Err(SkipReason::MissingFields);
    }

    serde_json::from_value(value).map_err(|e| SkipReason::Malformed(e.to_string()))
}

/// Classify one upload, fetching its body if the listing entry alone
/// does not rule it out.
pub async fn classify(store: &dyn BlobStore, record: &UploadRecord) -> Candidate {
    if let Some(reason) = prefilter(record) {
        return Candidate::Skipped(reason);
    }

    let body = match store.fetch(&record.cid).await {
        Ok(body) => body,
        Err(e) => return Candidate::Skipped(SkipReason::FetchFailed(e.to_string())),
    };

    match parse_metadata(&body) {
        Ok(metadata) => Candidate::Notebook(metadata),
        Err(reason) => Candidate::Skipped(reason),
    }
}

/// Sort newest first by [`NotebookMetadata::recency_key`]. Stable.
pub fn sort_by_recency(notebooks: &mut [NotebookMetadata]) {
    notebooks.sort_by(|a, b| b.recency_key().cmp(&a.recency_key()));
}

// The later of two revisions of one notebook: more recent, then more versions.
fn is_newer(candidate: &NotebookMetadata, kept: &NotebookMetadata) -> bool {
    (candidate.recency_key(), candidate.versions.len()) > (kept.recency_key(), kept.versions.len())
}

/// Scan every upload on the account.
///
/// Per-upload problems become [`Skipped`] entries; only a failure of the
/// listing call itself is an error.
pub async fn scan_notebooks(store: &dyn BlobStore) -> Result<Discovery> {
    let uploads = store.list_uploads().await.map_err(Error::Listing)?;
    tracing::debug!("Scanning {} uploads for notebooks", uploads.len());

    let mut found: Vec<(String, Option<String>, NotebookMetadata)> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut skipped = Vec::new();

    for record in &uploads {
        let metadata = match classify(store, record).await {
            Candidate::Notebook(metadata) => metadata,
            Candidate::Skipped(reason) => {
                tracing::debug!("Skipping {:?} ({}): {}", record.file_name, record.cid, reason);
                skipped.push(Skipped {
                    cid: record.cid.clone(),
                    file_name: record.file_name.clone(),
                    reason,
                });
                continue;
            }
        };

        tracing::debug!("Found notebook {} in {}", metadata.notebook_id, record.cid);
        let entry = (record.cid.clone(), record.file_name.clone(), metadata);

        match by_id.get(&entry.2.notebook_id) {
            Some(&index) => {
                let (cid, file_name, _) = if is_newer(&entry.2, &found[index].2) {
                    std::mem::replace(&mut found[index], entry)
                } else {
                    entry
                };
                skipped.push(Skipped {
                    cid,
                    file_name,
                    reason: SkipReason::Superseded,
                });
            }
            None => {
                by_id.insert(entry.2.notebook_id.clone(), found.len());
                found.push(entry);
            }
        }
    }

    let mut metadata_cids = HashMap::with_capacity(found.len());
    let mut notebooks = Vec::with_capacity(found.len());
    for (cid, _, metadata) in found {
        metadata_cids.insert(metadata.notebook_id.clone(), cid);
        notebooks.push(metadata);
    }
    sort_by_recency(&mut notebooks);

    tracing::debug!(
        "Discovery found {} notebooks, skipped {} uploads",
        notebooks.len(),
        skipped.len()
    );

    Ok(Discovery {
        notebooks,
        metadata_cids,
        skipped,
    })
}

/// All notebooks by any author, newest first.
///
/// A failed listing call yields an empty list, indistinguishable from an
/// account with no notebooks. Use [`scan_notebooks`] to tell them apart.
pub async fn list_all_notebooks(store: &dyn BlobStore) -> Vec<NotebookMetadata> {
    match scan_notebooks(store).await {
        Ok(discovery) => discovery.notebooks,
        Err(e) => {
            tracing::warn!("Error fetching all notebooks: {}", e);
            Vec::new()
        }
    }
}

/// Notebooks whose author matches `address` (case-insensitive).
pub async fn notebooks_by_author(store: &dyn BlobStore, address: &str) -> Vec<NotebookMetadata> {
    list_all_notebooks(store)
        .await
        .into_iter()
        .filter(|nb| nb.is_authored_by(address))
        .collect()
}

/// A single notebook by id.
pub async fn notebook_by_id(store: &dyn BlobStore, notebook_id: &str) -> Option<NotebookMetadata> {
    list_all_notebooks(store)
        .await
        .into_iter()
        .find(|nb| nb.notebook_id == notebook_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotebookVersion;
    use proptest::prelude::*;

    #[test]
    fn content_file_names_detected() {
        assert!(is_content_file_name("Lab_notes_v3.md"));
        assert!(is_content_file_name("readme.md"));
        assert!(is_content_file_name("draft_v12.txt"));
        assert!(is_content_file_name("draft_v2"));
        assert!(!is_content_file_name("notebook_metadata_notebook_1_abc.json"));
        assert!(!is_content_file_name("my_vacation.json"));
        assert!(!is_content_file_name("plain"));
    }

    #[test]
    fn metadata_names_with_version_like_ids_kept() {
        let name = "notebook_metadata_notebook_1700000000000_v12345678.json";
        assert!(!is_content_file_name(name));

        let record = UploadRecord::new("Qm", name).with_mime_type("application/json");
        assert_eq!(prefilter(&record), None);
    }

    #[test]
    fn prefilter_by_name_and_mime() {
        let content = UploadRecord::new("Qm1", "T_v1.md");
        assert_eq!(prefilter(&content), Some(SkipReason::ContentFileName));

        let markdown = UploadRecord::new("Qm2", "blob").with_mime_type("text/markdown");
        assert_eq!(prefilter(&markdown), Some(SkipReason::MarkdownMimeType));

        let json = UploadRecord::new("Qm3", "notebook_metadata_x.json")
            .with_mime_type("application/json");
        assert_eq!(prefilter(&json), None);
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert_eq!(parse_metadata("# markdown"), Err(SkipReason::NotJsonObject));
        assert_eq!(parse_metadata("[1,2]"), Err(SkipReason::NotJsonObject));
        assert!(matches!(parse_metadata("{not json"), Err(SkipReason::InvalidJson(_))));
    }

    #[test]
    fn parse_requires_identity_fields() {
        let missing_id = r#"{"author":"0xa","versions":[]}"#;
        let empty_author = r#"{"notebook_id":"n","author":"","versions":[]}"#;
        let versions_not_array = r#"{"notebook_id":"n","author":"0xa","versions":{}}"#;
        let missing_versions = r#"{"notebook_id":"n","author":"0xa"}"#;
        for body in [missing_id, empty_author, versions_not_array, missing_versions] {
            assert_eq!(parse_metadata(body), Err(SkipReason::MissingFields), "{}", body);
        }
    }

    #[test]
    fn parse_reports_malformed_versions() {
        let body = r#"{"notebook_id":"n","author":"0xa","versions":[{"version":"one"}]}"#;
        assert!(matches!(parse_metadata(body), Err(SkipReason::Malformed(_))));
    }

    #[test]
    fn parse_accepts_minimal_and_leading_whitespace() {
        let body = "\n  {\"notebook_id\":\"n\",\"author\":\"0xa\",\"versions\":[]}";
        let nb = parse_metadata(body).unwrap();
        assert_eq!(nb.notebook_id, "n");
        assert!(nb.versions.is_empty());
        assert!(nb.title.is_empty());
    }

    fn dated(id: &str, updated_at: &str, last_version: Option<&str>) -> NotebookMetadata {
        NotebookMetadata {
            notebook_id: id.into(),
            author: "0xa".into(),
            title: id.into(),
            versions: last_version
                .map(|ts| vec![NotebookVersion::new("Qm".into(), 1, "x", ts.into())])
                .unwrap_or_default(),
            created_at: String::new(),
            updated_at: updated_at.into(),
        }
    }

    #[test]
    fn sort_newest_first_with_ties_on_last_version() {
        let mut notebooks = vec![
            dated("a", "2024-01-01", None),
            dated("b", "2024-06-01", None),
            dated("c", "2024-03-01", Some("2024-02-01T00:00:00.000Z")),
            dated("d", "2024-03-01", Some("2024-02-02T00:00:00.000Z")),
            dated("e", "", Some("2024-04-01T00:00:00.000Z")),
        ];
        sort_by_recency(&mut notebooks);
        let ids: Vec<&str> = notebooks.iter().map(|n| n.notebook_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "e", "d", "c", "a"]);
    }

    proptest! {
        #[test]
        fn sorted_is_non_increasing(days in proptest::collection::vec(1u32..28, 0..20)) {
            let mut notebooks: Vec<NotebookMetadata> = days
                .iter()
                .enumerate()
                .map(|(i, d)| dated(&i.to_string(), &format!("2024-02-{:02}", d), None))
                .collect();
            sort_by_recency(&mut notebooks);
            prop_assert!(notebooks
                .windows(2)
                .all(|w| w[0].recency_key() >= w[1].recency_key()));
        }
    }
}
