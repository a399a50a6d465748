// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `GemRelay` Store
//!
//! Configuration for the `GemRelay` client.
//!
//! This crate provides:
//!
//! - **`RelayConfig`**: The YAML configuration file model, validation and
//!   conversion to [`gemrelay_client::ClientSettings`]
//! - **Persistence**: Default paths and owner-only atomic file writes
//!
//! ## Usage
//!
//! ```ignore
//! use gemrelay_store::RelayConfig;
//!
//! let config = RelayConfig::load().await?.with_env_overrides();
//! config.validate()?;
//! let settings = config.client_settings();
//! ```

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{
    ProxyConfig, RelayConfig, API_KEYS_ENV, DEFAULT_TEMPLATE, PLACEHOLDER_KEY,
    PLACEHOLDER_PROXY_HOST,
};
pub use error::ConfigError;
pub use persistence::{default_config_dir, default_config_path, load_yaml, save_yaml, write_secure};
