//! Notebook version model.

use super::timestamp;
use serde::{Deserialize, Serialize};

/// Number of content characters kept in a preview.
pub const PREVIEW_CHARS: usize = 100;

/// Appended to a preview when the content was cut.
pub const PREVIEW_MARKER: &str = "...";

/// One saved version of a notebook. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookVersion {
    /// CID of the content blob (`cid` in blobs written by older clients)
    #[serde(alias = "cid")]
    pub content_id: String,

    /// Save time (ISO 8601)
    #[serde(default)]
    pub timestamp: String,

    /// 1-based version number
    pub version: u32,

    /// Truncated content prefix
    #[serde(default)]
    pub preview: String,
}

impl NotebookVersion {
    /// Create a version for freshly uploaded content.
    pub fn new(content_id: String, version: u32, content: &str, timestamp: String) -> Self {
        Self {
            content_id,
            timestamp,
            version,
            preview: Self::preview_of(content),
        }
    }

    /// First [`PREVIEW_CHARS`] characters of the content, plus
    /// [`PREVIEW_MARKER`] if anything was cut.
    pub fn preview_of(content: &str) -> String {
        match content.char_indices().nth(PREVIEW_CHARS) {
            Some((cut, _)) => format!("{}{}", &content[..cut], PREVIEW_MARKER),
            None => content.to_string(),
        }
    }

    /// Save time in unix milliseconds (epoch 0 if missing or unparseable).
    pub fn timestamp_millis(&self) -> i64 {
        timestamp::millis_or_epoch(&self.timestamp)
    }

    /// Human-readable citation for this version.
    pub fn citation(&self) -> String {
        format!(
            "Research Notebook v{}, IPFS CID: {}, Timestamp: {}",
            self.version, self.content_id, self.timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_content_kept_whole() {
        assert_eq!(NotebookVersion::preview_of("# Notes"), "# Notes");
        let exact = "x".repeat(PREVIEW_CHARS);
        assert_eq!(NotebookVersion::preview_of(&exact), exact);
    }

    #[test]
    fn long_content_truncated_with_marker() {
        let content = "y".repeat(PREVIEW_CHARS + 1);
        let preview = NotebookVersion::preview_of(&content);
        assert_eq!(preview, format!("{}...", "y".repeat(PREVIEW_CHARS)));
        assert_eq!(preview.chars().count(), 103);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let content = "é".repeat(150);
        let preview = NotebookVersion::preview_of(&content);
        assert_eq!(preview, format!("{}...", "é".repeat(100)));
    }

    #[test]
    fn accepts_legacy_cid_field() {
        let json = r#"{"cid":"QmOld","timestamp":"2024-01-01T00:00:00.000Z","version":1,"preview":"hi"}"#;
        let v: NotebookVersion = serde_json::from_str(json).unwrap();
        assert_eq!(v.content_id, "QmOld");
        assert_eq!(v.version, 1);
    }

    #[test]
    fn serializes_content_id() {
        let v = NotebookVersion::new("QmNew".into(), 2, "body", "2024-01-01T00:00:00.000Z".into());
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["content_id"], "QmNew");
        assert!(json.get("cid").is_none());
    }

    #[test]
    fn citation_format() {
        let v = NotebookVersion::new("QmC".into(), 3, "body", "2024-02-02T10:00:00.000Z".into());
        assert_eq!(
            v.citation(),
            "Research Notebook v3, IPFS CID: QmC, Timestamp: 2024-02-02T10:00:00.000Z"
        );
    }

    proptest! {
        #[test]
        fn preview_is_prefix_and_bounded(content in "\\PC{0,300}") {
            let preview = NotebookVersion::preview_of(&content);
            let len = content.chars().count();
            if len <= PREVIEW_CHARS {
                prop_assert_eq!(&preview, &content);
            } else {
                let head: String = content.chars().take(PREVIEW_CHARS).collect();
                prop_assert_eq!(preview, format!("{}{}", head, PREVIEW_MARKER));
            }
        }
    }
}
