//! Machine Type Update API server

use kubevirt_client::KubeVirtClient;
use machine_type_api::{ApiConfig, ApiServer};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    info!("Starting Machine Type Update API");

    let config = ApiConfig::from_env()?;
    info!("Configuration:");
    info!("  Bind address: {}", config.bind_address);
    info!(
        "  Updater image: {}",
        config.updater_image.as_deref().unwrap_or("<per request>")
    );

    let client = KubeVirtClient::try_default().await?;
    let server = ApiServer::new(config, Arc::new(client));
    server.start().await
}
