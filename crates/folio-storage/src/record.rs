//! Upload records returned by account listing.

use serde::{Deserialize, Deserializer, Serialize};

/// One blob uploaded under the account.
///
/// Field names follow the Lighthouse `files_uploaded` response. Everything
/// except the CID is optional since the listing is only a hint about what
/// the blob contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    /// Content identifier
    pub cid: String,

    /// Listing cursor for this record (used as `lastKey` when paging)
    #[serde(default)]
    pub id: Option<String>,

    /// File name given at upload time
    #[serde(default)]
    pub file_name: Option<String>,

    /// Declared media type
    #[serde(default)]
    pub mime_type: Option<String>,

    /// Upload time in unix milliseconds
    #[serde(default, deserialize_with = "lenient_u64")]
    pub created_at: Option<u64>,

    /// Blob size in bytes
    #[serde(default, rename = "fileSizeInBytes", deserialize_with = "lenient_u64")]
    pub size: Option<u64>,
}

impl UploadRecord {
    /// Create a record with only a CID and file name.
    pub fn new(cid: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            cid: cid.into(),
            id: None,
            file_name: Some(file_name.into()),
            mime_type: None,
            created_at: None,
            size: None,
        }
    }

    /// Builder: set the media type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

// The service reports sizes as strings and timestamps as numbers; accept either.
fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lighthouse_listing_entry() {
        let json = r#"{
            "publicKey": "0xabc",
            "fileName": "notebook_metadata_notebook_1_x.json",
            "mimeType": "application/json",
            "txHash": "",
            "status": "queued",
            "createdAt": 1717171717171,
            "fileSizeInBytes": "512",
            "cid": "QmTest",
            "id": "5f1c",
            "lastUpdate": 1717171717171,
            "encryption": false
        }"#;

        let record: UploadRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.cid, "QmTest");
        assert_eq!(record.id.as_deref(), Some("5f1c"));
        assert_eq!(record.file_name.as_deref(), Some("notebook_metadata_notebook_1_x.json"));
        assert_eq!(record.mime_type.as_deref(), Some("application/json"));
        assert_eq!(record.created_at, Some(1717171717171));
        assert_eq!(record.size, Some(512));
    }

    #[test]
    fn missing_optional_fields() {
        let record: UploadRecord = serde_json::from_str(r#"{"cid":"QmOnly"}"#).unwrap();
        assert_eq!(record.cid, "QmOnly");
        assert!(record.file_name.is_none());
        assert!(record.size.is_none());
    }
}
