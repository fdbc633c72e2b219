//! API server configuration, read from the environment.

use anyhow::{Context, Result};
use std::net::SocketAddr;

pub const BIND_ADDRESS_ENV: &str = "BIND_ADDRESS";
pub const UPDATER_IMAGE_ENV: &str = "MACHINE_TYPE_UPDATER_IMAGE";

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8443";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_address: SocketAddr,
    /// Image used for jobs whose request does not name one
    pub updater_image: Option<String>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = lookup(BIND_ADDRESS_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_address
            .parse()
            .with_context(|| format!("invalid {} \"{}\"", BIND_ADDRESS_ENV, bind_address))?;
        let updater_image = lookup(UPDATER_IMAGE_ENV).filter(|image| !image.is_empty());

        Ok(Self {
            bind_address,
            updater_image,
        })
    }
}
