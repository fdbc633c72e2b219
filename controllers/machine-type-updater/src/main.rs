//! Machine Type Updater
//!
//! One-shot job that clears the machine type of every KubeVirt
//! VirtualMachine in a namespace whose type matches a glob, so the VMs pick
//! up the default machine type of their architecture on next boot.
//!
//! Running VMs can optionally be restarted right away.

mod config;
mod error;
mod pattern;
mod updater;

#[cfg(test)]
mod test_utils;

use crate::config::UpdaterConfig;
use crate::error::UpdaterError;
use crate::updater::MachineTypeUpdater;
use kubevirt_client::KubeVirtClient;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), UpdaterError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Ignore the error if a provider is already installed
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    let config = UpdaterConfig::from_env().map_err(|e| {
        error!("{}", e);
        e
    })?;

    info!("Configuration:");
    info!("  Machine type glob: {}", config.machine_type_glob);
    info!("  Namespace: {}", config.namespace);
    info!("  Restart required: {}", config.restart_required);
    info!("  Label selector: \"{}\"", config.label_selector);

    let client = KubeVirtClient::try_default().await.map_err(|e| {
        error!("Error retrieving virt client: {}", e);
        UpdaterError::Client(e)
    })?;

    let updater = MachineTypeUpdater::new(client, config);
    updater.run().await?;

    Ok(())
}
