//! Lighthouse storage backend.
//!
//! Uploads go to the Lighthouse node (`/api/v0/add`), listing goes to the
//! account API (`/api/user/files_uploaded`), and retrieval goes through
//! public IPFS gateways.

use crate::error::{Result, StorageError};
use crate::gateway::{GatewayFetcher, DEFAULT_GATEWAYS};
use crate::record::UploadRecord;
use crate::BlobStore;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

/// Default upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://node.lighthouse.storage";

/// Default account API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.lighthouse.storage";

/// Upper bound on listing pages, in case the cursor never advances.
const MAX_LISTING_PAGES: usize = 10_000;

/// Configuration for [`LighthouseStore`].
#[derive(Debug, Clone)]
pub struct LighthouseConfig {
    /// Account API key (sent as a bearer token)
    pub api_key: String,

    /// Upload node base URL
    pub upload_url: String,

    /// Account API base URL
    pub api_url: String,

    /// Gateways for retrieval, in preference order
    pub gateways: Vec<String>,

    /// Transport timeout per request
    pub timeout: Duration,
}

impl LighthouseConfig {
    /// Config with default endpoints for the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            gateways: DEFAULT_GATEWAYS.iter().map(|g| g.to_string()).collect(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadsPage {
    #[serde(default)]
    file_list: Vec<UploadRecord>,
    #[serde(default)]
    total_files: Option<u64>,
}

/// Blob store backed by Lighthouse.
pub struct LighthouseStore {
    client: reqwest::Client,
    api_key: String,
    upload_url: String,
    api_url: String,
    gateway: GatewayFetcher,
}

impl LighthouseStore {
    /// Create a store from config.
    pub fn new(config: LighthouseConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(StorageError::InvalidInput("Lighthouse API key is empty".into()));
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let gateway = GatewayFetcher::new(client.clone(), config.gateways);

        Ok(Self {
            client,
            api_key: config.api_key,
            upload_url: config.upload_url.trim_end_matches('/').to_string(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            gateway,
        })
    }

    /// The gateway fetcher used for retrieval.
    pub fn gateway(&self) -> &GatewayFetcher {
        &self.gateway
    }

    async fn list_page(&self, last_key: Option<&str>) -> Result<UploadsPage> {
        let url = format!("{}/api/user/files_uploaded", self.api_url);
        let mut request = self.client.get(&url).bearer_auth(&self.api_key);
        if let Some(key) = last_key {
            request = request.query(&[("lastKey", key)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Listing(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Listing(format!("listing returned {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StorageError::Listing(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl BlobStore for LighthouseStore {
    async fn upload(&self, file_name: &str, mime_type: &str, body: String) -> Result<String> {
        let part = Part::text(body)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| StorageError::InvalidInput(e.to_string()))?;
        let form = Form::new().part("file", part);

        let url = format!("{}/api/v0/add", self.upload_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Upload(format!("upload service returned {}", status)));
        }

        // The node answers one JSON object per added file.
        let text = response
            .text()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;
        let line = text
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| StorageError::Upload("empty upload response".into()))?;
        let added: AddResponse = serde_json::from_str(line)?;

        tracing::debug!("Uploaded {} as {}", file_name, added.hash);
        Ok(added.hash)
    }

    async fn fetch(&self, cid: &str) -> Result<String> {
        self.gateway.fetch(cid).await
    }

    async fn list_uploads(&self) -> Result<Vec<UploadRecord>> {
        let mut records: Vec<UploadRecord> = Vec::new();
        let mut last_key: Option<String> = None;

        for _ in 0..MAX_LISTING_PAGES {
            let page = self.list_page(last_key.as_deref()).await?;
            if page.file_list.is_empty() {
                break;
            }

            let next_key = page.file_list.last().and_then(|r| r.id.clone());
            records.extend(page.file_list);

            let done = match page.total_files {
                Some(total) => records.len() as u64 >= total,
                None => true,
            };
            if done || next_key.is_none() || next_key == last_key {
                break;
            }
            last_key = next_key;
        }

        tracing::debug!("Listed {} uploads", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_rejected() {
        let result = LighthouseStore::new(LighthouseConfig::new("  "));
        assert!(matches!(result, Err(StorageError::InvalidInput(_))));
    }

    #[test]
    fn default_config_endpoints() {
        let config = LighthouseConfig::new("key");
        assert_eq!(config.upload_url, DEFAULT_UPLOAD_URL);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.gateways.len(), 3);
    }

    #[test]
    fn parses_add_response() {
        let added: AddResponse =
            serde_json::from_str(r#"{"Name":"a.md","Hash":"QmHash","Size":"12"}"#).unwrap();
        assert_eq!(added.hash, "QmHash");
    }
}
