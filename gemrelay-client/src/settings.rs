//! Client settings.
//!
//! Everything the pipeline reads from its host's configuration, already
//! validated and converted to typed values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default `generateContent` endpoint. The key is appended per request.
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent";

/// Default per-call timeout in seconds.
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Proxy Settings
// ============================================================================

/// Kind of forward proxy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProxyKind {
    /// HTTP CONNECT proxy.
    #[default]
    Http,
    /// SOCKS5 proxy.
    #[serde(alias = "SOCKS5")]
    Socks,
}

impl ProxyKind {
    /// URL scheme for this kind.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Socks => "socks5",
        }
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "HTTP"),
            Self::Socks => write!(f, "SOCKS"),
        }
    }
}

/// Forward proxy with optional basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxySettings {
    /// Proxy host.
    pub host: String,
    /// Proxy port.
    pub port: u16,
    /// Proxy kind.
    pub kind: ProxyKind,
    /// Username (empty for no authentication).
    pub user: String,
    /// Password.
    pub password: String,
}

impl ProxySettings {
    /// Returns the proxy URL (without credentials).
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.kind.scheme(), self.host, self.port)
    }

    /// Returns true if basic authentication should be sent.
    pub fn has_auth(&self) -> bool {
        !self.user.is_empty()
    }
}

impl fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("kind", &self.kind)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client Settings
// ============================================================================

/// Settings for the request pipeline and translation workflow.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Endpoint URL without the key parameter.
    pub endpoint: String,
    /// Language answers and translations should use.
    pub language: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Attempt budget of bounded requests.
    pub max_retries: u32,
    /// Timeout of a single network call.
    pub call_timeout: Duration,
    /// Retry delays.
    pub retry: RetryPolicy,
    /// Optional forward proxy.
    pub proxy: Option<ProxySettings>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: "English".to_string(),
            temperature: 1.0,
            max_retries: 3,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            proxy: None,
        }
    }
}

impl ClientSettings {
    /// Sets the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the answer language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the attempt budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the proxy.
    pub fn with_proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Rules block prepended to bounded prompts.
    pub fn rules_prefix(&self) -> String {
        format!(
            "[Rules: `Use {} language.`, `Do not use \" character.`] ",
            self.language
        )
    }
}
