//! Folio Node binary
//!
//! Serves the notebook HTTP API.

use folio_notebook::{FolioConfig, FolioNode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_node=info,folio_notebook=info,folio_storage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Folio Node");

    let config = FolioConfig::from_env()?;

    let node = FolioNode::new(config)?;
    node.run().await?;

    Ok(())
}
