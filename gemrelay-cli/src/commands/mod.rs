//! CLI command implementations.

pub mod ask;
pub mod config;
pub mod keys;
pub mod translate;

use anyhow::{Context, Result};
use gemrelay_client::RelayClient;
use gemrelay_store::RelayConfig;
use std::path::PathBuf;
use tracing::debug;

use crate::Cli;

/// Returns the configuration path selected on the command line.
pub fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(RelayConfig::default_path)
}

/// Loads the configuration with environment overrides applied.
pub async fn load_config(cli: &Cli) -> Result<RelayConfig> {
    let path = config_path(cli);
    let config = RelayConfig::load_from(&path)
        .await
        .with_context(|| format!("Failed to load {}", path.display()))?;

    Ok(config.with_env_overrides())
}

/// Loads and validates the configuration, then builds a client from it.
pub async fn build_client(cli: &Cli) -> Result<RelayClient> {
    let config = load_config(cli).await?;
    config.validate()?;

    let settings = config.client_settings();
    debug!(
        keys = config.api_keys.len(),
        language = %settings.language,
        proxy = settings.proxy.is_some(),
        "Building client"
    );

    let client = RelayClient::from_settings(settings, config.keys())?;
    Ok(client)
}
