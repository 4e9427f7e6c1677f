//! IPFS gateway retrieval with ordered fallback.
//!
//! A CID resolves via `https://<gateway-host>/ipfs/<cid>` on any public
//! gateway. Gateways are tried strictly in preference order; the first one
//! that answers with a success status wins.

use crate::error::{Result, StorageError};

/// Default gateways, in preference order.
pub const DEFAULT_GATEWAYS: [&str; 3] = [
    "https://gateway.lighthouse.storage",
    "https://ipfs.io",
    "https://cloudflare-ipfs.com",
];

/// Fetches blobs from an ordered list of IPFS gateways.
#[derive(Debug, Clone)]
pub struct GatewayFetcher {
    client: reqwest::Client,
    gateways: Vec<String>,
}

impl GatewayFetcher {
    /// Create a fetcher over the given gateway base URLs.
    pub fn new(client: reqwest::Client, gateways: Vec<String>) -> Self {
        let gateways = gateways
            .into_iter()
            .map(|g| g.trim().trim_end_matches('/').to_string())
            .filter(|g| !g.is_empty())
            .collect();
        Self { client, gateways }
    }

    /// Create a fetcher over [`DEFAULT_GATEWAYS`].
    pub fn with_defaults(client: reqwest::Client) -> Self {
        Self::new(client, DEFAULT_GATEWAYS.iter().map(|g| g.to_string()).collect())
    }

    /// Gateway base URLs in preference order.
    pub fn gateways(&self) -> &[String] {
        &self.gateways
    }

    /// Retrieval URL for a CID on one gateway.
    pub fn url_for(gateway: &str, cid: &str) -> String {
        format!("{}/ipfs/{}", gateway.trim_end_matches('/'), cid)
    }

    /// Fetch a blob body, falling back through the gateway list.
    pub async fn fetch(&self, cid: &str) -> Result<String> {
        if cid.trim().is_empty() {
            return Err(StorageError::InvalidInput("empty content identifier".into()));
        }

        for gateway in &self.gateways {
            let url = Self::url_for(gateway, cid);
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => match response.text().await {
                    Ok(body) => {
                        tracing::debug!("Resolved {} via {}", cid, gateway);
                        return Ok(body);
                    }
                    Err(e) => {
                        tracing::debug!("Failed reading body from {}: {}", url, e);
                    }
                },
                Ok(response) => {
                    tracing::debug!("Gateway {} answered {} for {}", gateway, response.status(), cid);
                }
                Err(e) => {
                    tracing::debug!("Failed to fetch from {}: {}, trying next gateway", url, e);
                }
            }
        }

        tracing::warn!("All gateways failed for {}", cid);
        Err(StorageError::AllGatewaysFailed {
            cid: cid.to_string(),
            attempted: self.gateways.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_shape() {
        assert_eq!(
            GatewayFetcher::url_for("https://ipfs.io/", "QmX"),
            "https://ipfs.io/ipfs/QmX"
        );
    }

    #[test]
    fn defaults_keep_preference_order() {
        let fetcher = GatewayFetcher::with_defaults(reqwest::Client::new());
        assert_eq!(fetcher.gateways().len(), 3);
        assert_eq!(fetcher.gateways()[0], "https://gateway.lighthouse.storage");
        assert_eq!(fetcher.gateways()[2], "https://cloudflare-ipfs.com");
    }

    #[test]
    fn blank_gateways_dropped() {
        let fetcher = GatewayFetcher::new(
            reqwest::Client::new(),
            vec![" https://a.example/ ".into(), "".into(), "https://b.example".into()],
        );
        assert_eq!(fetcher.gateways(), &["https://a.example", "https://b.example"]);
    }

    #[tokio::test]
    async fn empty_gateway_list_fails() {
        let fetcher = GatewayFetcher::new(reqwest::Client::new(), Vec::new());
        match fetcher.fetch("QmX").await {
            Err(StorageError::AllGatewaysFailed { attempted, .. }) => assert_eq!(attempted, 0),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
