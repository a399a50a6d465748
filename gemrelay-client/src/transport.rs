//! HTTP transport for `generateContent` calls.
//!
//! The pipeline only sees the [`Transport`] trait; [`HttpTransport`] is the
//! reqwest-backed implementation with timeout and proxy support.

use async_trait::async_trait;
use gemrelay_core::GenerateRequest;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::TransportError;
use crate::settings::ProxySettings;

/// User agent string for GemRelay.
const USER_AGENT: &str = concat!("GemRelay/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Transport Trait
// ============================================================================

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text (may be empty).
    pub body: String,
}

impl TransportResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends request bodies to the API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `body` as JSON to `url`.
    ///
    /// Only failures to obtain a response are errors; non-success statuses
    /// come back as a [`TransportResponse`].
    async fn post(
        &self,
        url: &str,
        body: &GenerateRequest,
    ) -> Result<TransportResponse, TransportError>;
}

// ============================================================================
// HTTP Transport
// ============================================================================

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client,
}

impl HttpTransport {
    /// Creates a transport with the given per-call timeout and optional proxy.
    ///
    /// # Errors
    ///
    /// Fails if the proxy URL is invalid or the client cannot be built.
    pub fn new(timeout: Duration, proxy: Option<&ProxySettings>) -> Result<Self, TransportError> {
        let mut builder = Client::builder().timeout(timeout).user_agent(USER_AGENT);

        if let Some(settings) = proxy {
            info!(
                proxy = %settings.url(),
                "Proxy configured, requests will be sent through it"
            );
            builder = builder.proxy(build_proxy(settings)?);
        }

        let inner = builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip_all)]
    async fn post(
        &self,
        url: &str,
        body: &GenerateRequest,
    ) -> Result<TransportResponse, TransportError> {
        debug!("POST request with JSON");

        let response = self.inner.post(url).json(body).send().await?;
        let status = response.status().as_u16();
        debug!(status, "Response received");

        let body = response.text().await?;
        Ok(TransportResponse::new(status, body))
    }
}

/// Builds a reqwest proxy from settings.
fn build_proxy(settings: &ProxySettings) -> Result<reqwest::Proxy, TransportError> {
    let proxy =
        reqwest::Proxy::all(settings.url()).map_err(|e| TransportError::Proxy(e.to_string()))?;

    if settings.has_auth() {
        Ok(proxy.basic_auth(&settings.user, &settings.password))
    } else {
        Ok(proxy)
    }
}

/// Appends the API key to the endpoint as the `key` query parameter.
///
/// # Errors
///
/// Fails if `endpoint` is not an absolute URL.
pub fn endpoint_with_key(endpoint: &str, key: &str) -> Result<String, TransportError> {
    let mut url = Url::parse(endpoint).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
    url.query_pairs_mut().append_pair("key", key);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProxyKind;

    #[test]
    fn test_endpoint_with_key() {
        let url = endpoint_with_key(
            "https://generativelanguage.googleapis.com/v1beta/models/m:generateContent",
            "abc123",
        )
        .unwrap();

        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/m:generateContent?key=abc123"
        );
    }

    #[test]
    fn test_endpoint_with_key_encodes() {
        let url = endpoint_with_key("https://example.com/gen", "a b&c").unwrap();
        assert_eq!(url, "https://example.com/gen?key=a+b%26c");
    }

    #[test]
    fn test_endpoint_invalid() {
        assert!(matches!(
            endpoint_with_key("not a url", "k"),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_response_success_range() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(429, "").is_success());
        assert!(!TransportResponse::new(500, "").is_success());
    }

    #[test]
    fn test_transport_builds_with_proxy() {
        let proxy = ProxySettings {
            host: "127.0.0.1".to_string(),
            port: 3128,
            kind: ProxyKind::Http,
            user: "user".to_string(),
            password: "pass".to_string(),
        };

        assert!(HttpTransport::new(Duration::from_secs(5), Some(&proxy)).is_ok());
        assert!(HttpTransport::new(Duration::from_secs(5), None).is_ok());
    }
}
