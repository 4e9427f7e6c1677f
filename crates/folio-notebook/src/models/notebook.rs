//! Notebook metadata model.

use super::timestamp;
use super::version::NotebookVersion;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Metadata for one revision of a notebook.
///
/// Each save produces a new metadata object with one more version appended;
/// earlier metadata blobs stay on the network unchanged. `notebook_id` and
/// `created_at` are stable across all revisions of the same notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookMetadata {
    /// Globally unique notebook identifier
    pub notebook_id: String,

    /// Author account address
    pub author: String,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    /// Versions in save order (`versions[i].version == i + 1`)
    pub versions: Vec<NotebookVersion>,

    /// First save time (ISO 8601)
    #[serde(default)]
    pub created_at: String,

    /// Latest save time (ISO 8601)
    #[serde(default)]
    pub updated_at: String,
}

impl NotebookMetadata {
    /// File name the metadata blob is uploaded under.
    pub fn metadata_file_name(&self) -> String {
        format!("notebook_metadata_{}.json", self.notebook_id)
    }

    /// Most recent version.
    pub fn latest(&self) -> Option<&NotebookVersion> {
        self.versions.last()
    }

    /// Version by 1-based number.
    pub fn version(&self, number: u32) -> Option<&NotebookVersion> {
        let index = (number as usize).checked_sub(1)?;
        match self.versions.get(index) {
            Some(v) if v.version == number => Some(v),
            _ => self.versions.iter().find(|v| v.version == number),
        }
    }

    /// Number the next saved version will get.
    pub fn next_version_number(&self) -> u32 {
        self.versions.len() as u32 + 1
    }

    /// Whether `address` is the author (addresses compare case-insensitively).
    pub fn is_authored_by(&self, address: &str) -> bool {
        self.author.eq_ignore_ascii_case(address.trim())
    }

    /// Sort key for listings, newest first when compared descending.
    ///
    /// Primary: `updated_at`, falling back to the latest version's timestamp
    /// when `updated_at` is missing. Secondary: the latest version's
    /// timestamp. Missing or unparseable times count as epoch 0.
    pub fn recency_key(&self) -> (i64, i64) {
        let last_version = self.latest().map(|v| v.timestamp_millis()).unwrap_or(0);
        let updated = timestamp::parse_millis(&self.updated_at).unwrap_or(last_version);
        (updated, last_version)
    }

    /// Serialize to the wire format (pretty JSON, two-space indent).
    pub fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from the wire format.
    pub fn from_wire(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(n: u32, ts: &str) -> NotebookVersion {
        NotebookVersion::new(format!("Qm{}", n), n, "body", ts.to_string())
    }

    fn notebook() -> NotebookMetadata {
        NotebookMetadata {
            notebook_id: "notebook_1700000000000_abc123xyz".into(),
            author: "0xAbC".into(),
            title: "Lab notes".into(),
            versions: vec![
                version(1, "2024-01-01T00:00:00.000Z"),
                version(2, "2024-01-02T00:00:00.000Z"),
            ],
            created_at: "2024-01-01T00:00:00.000Z".into(),
            updated_at: "2024-01-02T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn wire_roundtrip() {
        let nb = notebook();
        let wire = nb.to_wire().unwrap();
        assert_eq!(NotebookMetadata::from_wire(&wire).unwrap(), nb);
    }

    #[test]
    fn wire_field_order_and_indent() {
        let wire = notebook().to_wire().unwrap();
        let order: Vec<usize> = ["\"notebook_id\"", "\"author\"", "\"title\"", "\"versions\"", "\"created_at\"", "\"updated_at\""]
            .iter()
            .map(|k| wire.find(k).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
        assert!(wire.starts_with("{\n  \"notebook_id\""));
    }

    #[test]
    fn version_lookup() {
        let nb = notebook();
        assert_eq!(nb.version(2).unwrap().content_id, "Qm2");
        assert!(nb.version(0).is_none());
        assert!(nb.version(3).is_none());
        assert_eq!(nb.latest().unwrap().version, 2);
        assert_eq!(nb.next_version_number(), 3);
    }

    #[test]
    fn authorship_ignores_case() {
        let nb = notebook();
        assert!(nb.is_authored_by("0xabc"));
        assert!(nb.is_authored_by("0XABC"));
        assert!(!nb.is_authored_by("0xabd"));
    }

    #[test]
    fn recency_falls_back_to_latest_version() {
        let mut nb = notebook();
        nb.updated_at = String::new();
        let latest = nb.latest().unwrap().timestamp_millis();
        assert_eq!(nb.recency_key(), (latest, latest));

        nb.versions.clear();
        assert_eq!(nb.recency_key(), (0, 0));
    }

    #[test]
    fn metadata_file_name() {
        assert_eq!(
            notebook().metadata_file_name(),
            "notebook_metadata_notebook_1700000000000_abc123xyz.json"
        );
    }
}
