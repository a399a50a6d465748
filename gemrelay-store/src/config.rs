//! Configuration management.

use gemrelay_client::{
    ClientSettings, ProxyKind, ProxySettings, RetryPolicy, DEFAULT_ENDPOINT,
};
use gemrelay_core::mask_key;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::persistence::{default_config_path, load_yaml, save_yaml, write_secure};

/// Placeholder shipped in the default key list.
pub const PLACEHOLDER_KEY: &str = "ADD_YOUR_KEY_HERE";

/// Placeholder shipped as the default proxy host.
pub const PLACEHOLDER_PROXY_HOST: &str = "PROXY_HOST";

/// Environment variable replacing `api-keys` (comma-separated).
pub const API_KEYS_ENV: &str = "GEMRELAY_API_KEYS";

/// Commented template written by [`RelayConfig::write_default`].
pub const DEFAULT_TEMPLATE: &str = r"# GemRelay configuration

# API keys used in rotation. Keys that hit their quota are skipped.
api-keys:
  - ADD_YOUR_KEY_HERE

# Attempts per request before giving up.
max-retries: 3

# Language answers and translations are written in.
language: English

temperature: 1.0
endpoint: https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent

# Delays between attempts, in seconds.
request-retry-secs: 5
translation-retry-secs: 10

# Timeout of a single call, in seconds.
call-timeout-secs: 30

# Forward proxy. Leave host as PROXY_HOST to connect directly.
# type: HTTP or SOCKS
proxy:
  host: PROXY_HOST
  port: 8080
  type: HTTP
  user: ''
  pass: ''
";

// ============================================================================
// Proxy Config
// ============================================================================

/// Proxy section of the configuration file.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy host, or the placeholder for no proxy.
    #[serde(default = "default_proxy_host")]
    pub host: String,
    /// Proxy port.
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    /// `HTTP` or `SOCKS`.
    #[serde(rename = "type", default)]
    pub kind: ProxyKind,
    /// Username, empty for none.
    #[serde(default)]
    pub user: String,
    /// Password.
    #[serde(default)]
    pub pass: String,
}

fn default_proxy_host() -> String {
    PLACEHOLDER_PROXY_HOST.to_string()
}

fn default_proxy_port() -> u16 {
    8080
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_proxy_host(),
            port: default_proxy_port(),
            kind: ProxyKind::Http,
            user: String::new(),
            pass: String::new(),
        }
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("kind", &self.kind)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl ProxyConfig {
    /// Returns true if a real proxy host is configured.
    pub fn is_enabled(&self) -> bool {
        let host = self.host.trim();
        !host.is_empty() && host != PLACEHOLDER_PROXY_HOST
    }

    /// Converts to client proxy settings, if enabled.
    pub fn settings(&self) -> Option<ProxySettings> {
        self.is_enabled().then(|| ProxySettings {
            host: self.host.trim().to_string(),
            port: self.port,
            kind: self.kind,
            user: self.user.clone(),
            password: self.pass.clone(),
        })
    }
}

// ============================================================================
// Relay Config
// ============================================================================

/// Application configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelayConfig {
    /// API keys.
    #[serde(default = "default_api_keys")]
    pub api_keys: Vec<String>,
    /// Attempt budget per request.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Answer and translation language.
    #[serde(default = "default_language")]
    pub language: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// `generateContent` endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Delay between request attempts, in seconds.
    #[serde(default = "default_request_retry_secs")]
    pub request_retry_secs: u64,
    /// Delay between translation attempts, in seconds.
    #[serde(default = "default_translation_retry_secs")]
    pub translation_retry_secs: u64,
    /// Per-call timeout, in seconds.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    /// Forward proxy.
    #[serde(default)]
    pub proxy: ProxyConfig,
}

fn default_api_keys() -> Vec<String> {
    vec![PLACEHOLDER_KEY.to_string()]
}

fn default_max_retries() -> u32 {
    3
}

fn default_language() -> String {
    "English".to_string()
}

fn default_temperature() -> f64 {
    1.0
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_retry_secs() -> u64 {
    5
}

fn default_translation_retry_secs() -> u64 {
    10
}

fn default_call_timeout_secs() -> u64 {
    30
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_keys: default_api_keys(),
            max_retries: default_max_retries(),
            language: default_language(),
            temperature: default_temperature(),
            endpoint: default_endpoint(),
            request_retry_secs: default_request_retry_secs(),
            translation_retry_secs: default_translation_retry_secs(),
            call_timeout_secs: default_call_timeout_secs(),
            proxy: ProxyConfig::default(),
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked: Vec<String> = self.api_keys.iter().map(|k| mask_key(k)).collect();
        f.debug_struct("RelayConfig")
            .field("api_keys", &masked)
            .field("max_retries", &self.max_retries)
            .field("language", &self.language)
            .field("temperature", &self.temperature)
            .field("endpoint", &self.endpoint)
            .field("request_retry_secs", &self.request_retry_secs)
            .field("translation_retry_secs", &self.translation_retry_secs)
            .field("call_timeout_secs", &self.call_timeout_secs)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl RelayConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub async fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()).await
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults.
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let config: RelayConfig = load_yaml(path).await?;

        info!(
            path = %path.display(),
            keys = config.api_keys.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub async fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        save_yaml(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Writes the commented default template to `path`.
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub async fn write_default(path: &Path, force: bool) -> Result<(), ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        write_secure(path, DEFAULT_TEMPLATE).await?;
        info!(path = %path.display(), "Wrote default configuration");
        Ok(())
    }

    /// Applies overrides from the environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_api_keys_override(std::env::var(API_KEYS_ENV).ok().as_deref())
    }

    /// Replaces the key list with a comma-separated override, if given.
    ///
    /// Blank entries are ignored; an override without any key is ignored
    /// entirely.
    #[must_use]
    pub fn with_api_keys_override(mut self, value: Option<&str>) -> Self {
        let Some(value) = value else {
            return self;
        };

        let keys: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect();

        if !keys.is_empty() {
            debug!(keys = keys.len(), "API keys taken from {}", API_KEYS_ENV);
            self.api_keys = keys;
        }
        self
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotConfigured`] without real keys,
    /// [`ConfigError::InvalidTemperature`] for a negative or non-finite
    /// temperature, [`ConfigError::Invalid`] for an empty endpoint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_keys.is_empty() {
            return Err(ConfigError::NotConfigured("no API keys listed".to_string()));
        }

        if self.api_keys.iter().any(|k| k.trim() == PLACEHOLDER_KEY) {
            return Err(ConfigError::NotConfigured(format!(
                "replace {PLACEHOLDER_KEY} with your API key"
            )));
        }

        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }

        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint is empty".to_string()));
        }

        Ok(())
    }

    /// Converts to client settings.
    pub fn client_settings(&self) -> ClientSettings {
        let retry = RetryPolicy::new(
            Duration::from_secs(self.request_retry_secs),
            Duration::from_secs(self.translation_retry_secs),
        );

        let settings = ClientSettings::default()
            .with_endpoint(self.endpoint.trim())
            .with_language(self.language.clone())
            .with_temperature(self.temperature)
            .with_max_retries(self.max_retries)
            .with_call_timeout(Duration::from_secs(self.call_timeout_secs))
            .with_retry(retry);

        match self.proxy.settings() {
            Some(proxy) => settings.with_proxy(proxy),
            None => settings,
        }
    }

    /// Returns the configured keys with surrounding whitespace removed.
    pub fn keys(&self) -> Vec<String> {
        self.api_keys.iter().map(|k| k.trim().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_not_configured() {
        let err = RelayConfig::default().validate().unwrap_err();
        assert!(err.is_not_configured());
    }

    #[test]
    fn test_template_matches_defaults() {
        let parsed: RelayConfig = serde_yaml::from_str(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(parsed, RelayConfig::default());
    }

    #[test]
    fn test_validate_temperature() {
        let mut config = RelayConfig {
            api_keys: vec!["real-key".to_string()],
            ..RelayConfig::default()
        };
        assert!(config.validate().is_ok());

        config.temperature = -0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTemperature(_))
        ));

        config.temperature = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_keys() {
        let config = RelayConfig {
            api_keys: Vec::new(),
            ..RelayConfig::default()
        };
        assert!(config.validate().unwrap_err().is_not_configured());
    }

    #[test]
    fn test_proxy_placeholder_disables_proxy() {
        let config = RelayConfig::default();
        assert!(!config.proxy.is_enabled());
        assert!(config.client_settings().proxy.is_none());
    }

    #[test]
    fn test_client_settings_conversion() {
        let config = RelayConfig {
            api_keys: vec!["k".to_string()],
            language: "German".to_string(),
            max_retries: 7,
            request_retry_secs: 2,
            translation_retry_secs: 4,
            proxy: ProxyConfig {
                host: "proxy.local".to_string(),
                port: 1080,
                kind: ProxyKind::Socks,
                user: "u".to_string(),
                pass: "p".to_string(),
            },
            ..RelayConfig::default()
        };

        let settings = config.client_settings();
        assert_eq!(settings.language, "German");
        assert_eq!(settings.max_retries, 7);
        assert_eq!(settings.retry.request_delay, Duration::from_secs(2));
        assert_eq!(settings.retry.translation_delay, Duration::from_secs(4));

        let proxy = settings.proxy.unwrap();
        assert_eq!(proxy.url(), "socks5://proxy.local:1080");
        assert_eq!(proxy.password, "p");
    }

    #[test]
    fn test_api_keys_override() {
        let config = RelayConfig::default().with_api_keys_override(Some(" a, ,b "));
        assert_eq!(config.api_keys, vec!["a", "b"]);

        let config = RelayConfig::default().with_api_keys_override(Some(" , "));
        assert_eq!(config.api_keys, default_api_keys());

        let config = RelayConfig::default().with_api_keys_override(None);
        assert_eq!(config.api_keys, default_api_keys());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let mut config = RelayConfig {
            api_keys: vec!["AIzaSyVerySecret1234".to_string()],
            ..RelayConfig::default()
        };
        config.proxy.pass = "hunter2".to_string();

        let debug = format!("{config:?}");
        assert!(!debug.contains("VerySecret"));
        assert!(!debug.contains("hunter2"));
    }
}
