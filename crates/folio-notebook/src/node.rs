//! Folio node - configuration and the API service.
//!
//! Architecture:
//! - One blob store (Lighthouse, or in-memory when no API key is set)
//! - One RocksDB session store under the data directory
//! - HTTP API for browser clients

use crate::api;
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::session::SessionStore;
use folio_storage::{BlobStore, LighthouseConfig, LighthouseStore, MemoryStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Configuration for a Folio node or CLI session.
#[derive(Debug, Clone)]
pub struct FolioConfig {
    /// Data directory (session database lives here)
    pub data_dir: PathBuf,

    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Lighthouse API key; empty means run on an in-memory store
    pub lighthouse_api_key: String,

    /// Lighthouse upload node
    pub upload_url: String,

    /// Lighthouse account API
    pub api_url: String,

    /// Retrieval gateways, in preference order
    pub gateways: Vec<String>,

    /// Transport timeout for storage requests
    pub http_timeout: Duration,
}

impl Default for FolioConfig {
    fn default() -> Self {
        let lighthouse = LighthouseConfig::new("");
        Self {
            data_dir: PathBuf::from("./folio-data"),
            api_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            lighthouse_api_key: String::new(),
            upload_url: lighthouse.upload_url,
            api_url: lighthouse.api_url,
            gateways: lighthouse.gateways,
            http_timeout: lighthouse.timeout,
        }
    }
}

impl FolioConfig {
    /// Create config from environment variables over the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("FOLIO_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(addr) = std::env::var("FOLIO_API_ADDR") {
            config.api_addr = addr
                .parse()
                .map_err(|_| Error::InvalidInput(format!("Invalid FOLIO_API_ADDR: {}", addr)))?;
        }

        if let Ok(key) = std::env::var("LIGHTHOUSE_API_KEY") {
            config.lighthouse_api_key = key.trim().to_string();
        }
        if let Ok(url) = std::env::var("LIGHTHOUSE_UPLOAD_URL") {
            config.upload_url = url;
        }
        if let Ok(url) = std::env::var("LIGHTHOUSE_API_URL") {
            config.api_url = url;
        }

        if let Ok(list) = std::env::var("FOLIO_GATEWAYS") {
            let gateways: Vec<String> = list
                .split(',')
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .collect();
            if gateways.is_empty() {
                return Err(Error::InvalidInput("FOLIO_GATEWAYS lists no gateways".into()));
            }
            config.gateways = gateways;
        }

        if let Ok(secs) = std::env::var("FOLIO_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::InvalidInput(format!("Invalid FOLIO_HTTP_TIMEOUT_SECS: {}", secs))
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Directory of the session database.
    pub fn session_dir(&self) -> PathBuf {
        self.data_dir.join("session")
    }

    /// Build the blob store this config describes, falling back to an
    /// in-memory store when no API key is set.
    pub fn build_store(&self) -> Result<Arc<dyn BlobStore>> {
        if self.lighthouse_api_key.is_empty() {
            tracing::warn!("LIGHTHOUSE_API_KEY not set, notebooks are kept in memory only");
            return Ok(Arc::new(MemoryStore::new()));
        }
        self.build_store_strict()
    }

    /// Build the Lighthouse store; a missing API key is an error.
    ///
    /// Short-lived processes use this, since an in-memory store would lose
    /// every save on exit.
    pub fn build_store_strict(&self) -> Result<Arc<dyn BlobStore>> {
        if self.lighthouse_api_key.is_empty() {
            return Err(Error::InvalidInput("LIGHTHOUSE_API_KEY is not set".into()));
        }

        let store = LighthouseStore::new(LighthouseConfig {
            api_key: self.lighthouse_api_key.clone(),
            upload_url: self.upload_url.clone(),
            api_url: self.api_url.clone(),
            gateways: self.gateways.clone(),
            timeout: self.http_timeout,
        })
        .map_err(|e| Error::InvalidInput(e.to_string()))?;
        Ok(Arc::new(store))
    }
}

/// Shared state for API handlers.
pub struct FolioState {
    pub store: Arc<dyn BlobStore>,
    pub session: Arc<SessionStore>,
    pub identity: Arc<Identity>,
}

impl FolioState {
    /// Open session state under `config.data_dir` around an existing store.
    pub fn open(config: &FolioConfig, store: Arc<dyn BlobStore>) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let session = Arc::new(SessionStore::open(config.session_dir())?);
        let identity = Arc::new(Identity::restore(Arc::clone(&session))?);
        Ok(Self {
            store,
            session,
            identity,
        })
    }

    /// Make `notebook_id` the open notebook unless one is already open.
    pub fn remember_notebook(&self, notebook_id: &str) -> Result<()> {
        if self.session.current_notebook()?.is_none() {
            self.session.set_current_notebook(notebook_id)?;
        }
        Ok(())
    }
}

/// A Folio node instance.
pub struct FolioNode {
    state: Arc<FolioState>,
    config: FolioConfig,
}

impl FolioNode {
    /// Create a node with the store described by `config`.
    pub fn new(config: FolioConfig) -> Result<Self> {
        let store = config.build_store()?;
        Self::with_store(config, store)
    }

    /// Create a node around an existing store.
    pub fn with_store(config: FolioConfig, store: Arc<dyn BlobStore>) -> Result<Self> {
        let state = Arc::new(FolioState::open(&config, store)?);
        Ok(Self { state, config })
    }

    /// Get the shared state (for API handlers).
    pub fn state(&self) -> Arc<FolioState> {
        Arc::clone(&self.state)
    }

    /// Run the HTTP API until the listener fails.
    pub async fn run(self) -> Result<()> {
        tracing::info!("Folio node starting");
        tracing::info!("  API: http://{}", self.config.api_addr);
        tracing::info!("  Data: {:?}", self.config.data_dir);
        tracing::info!("  Gateways: {}", self.config.gateways.join(", "));

        let app = api::build_router(self.state()).layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind(self.config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", self.config.api_addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let config = FolioConfig::default();
        assert_eq!(config.api_addr.port(), 8080);
        assert_eq!(config.gateways.len(), 3);
        assert_eq!(config.session_dir(), PathBuf::from("./folio-data/session"));
    }

    #[test]
    fn strict_store_needs_api_key() {
        let config = FolioConfig::default();
        assert!(config.build_store().is_ok());
        assert!(matches!(config.build_store_strict(), Err(Error::InvalidInput(_))));

        let keyed = FolioConfig {
            lighthouse_api_key: "key".into(),
            ..FolioConfig::default()
        };
        assert!(keyed.build_store_strict().is_ok());
    }

    #[test]
    fn remember_notebook_keeps_first() {
        let dir = tempdir().unwrap();
        let config = FolioConfig {
            data_dir: dir.path().to_path_buf(),
            ..FolioConfig::default()
        };
        let node = FolioNode::with_store(config, Arc::new(MemoryStore::new())).unwrap();
        let state = node.state();

        state.remember_notebook("notebook_a").unwrap();
        state.remember_notebook("notebook_b").unwrap();
        assert_eq!(
            state.session.current_notebook().unwrap().as_deref(),
            Some("notebook_a")
        );
    }
}
