//! Relay error types.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Main Relay Error
// ============================================================================

/// Error type for relay operations.
///
/// Retryable kinds are handled inside the request chains and only show up
/// in logs. Terminal kinds are what failure callbacks receive.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request never produced a response (connect error, timeout).
    #[error("Transport failure: {0}")]
    TransportFailure(#[from] TransportError),

    /// The API rejected the credential for exceeding its quota.
    #[error("API key quota exceeded: {credential}")]
    QuotaExceeded {
        /// Identifier of the exhausted credential.
        credential: String,
    },

    /// The API answered with a non-success status.
    #[error("Request failed: {status}, {body}")]
    NonSuccessStatus {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Neither JSON repair nor the text fallback produced a value.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The API answered successfully but without a body.
    #[error("Empty response body")]
    EmptyBody,

    /// Every credential in the pool is exhausted.
    #[error("All API keys have exceeded quota. Please add new keys.")]
    PoolExhausted,

    /// The retry budget ran out.
    #[error("Max retries reached after {attempts} attempts")]
    RetriesExhausted {
        /// The budget the chain started with.
        attempts: u32,
    },

    /// A translated document could not be loaded.
    #[error("Failed to load translated document: {0}")]
    DeserializationFailure(String),

    /// The translation source file could not be read.
    #[error("Cannot read translation source {path}: {source}")]
    SourceUnreadable {
        /// Path of the source file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The chain ended without invoking either callback.
    #[error("Request chain ended without an outcome")]
    Abandoned,
}

impl RelayError {
    /// Returns true if the chains handle this error by retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelayError::TransportFailure(_)
                | RelayError::QuotaExceeded { .. }
                | RelayError::NonSuccessStatus { .. }
                | RelayError::MalformedResponse(_)
        )
    }

    /// Returns true if this error ends a chain and reaches the caller.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RelayError::EmptyBody
                | RelayError::PoolExhausted
                | RelayError::RetriesExhausted { .. }
                | RelayError::SourceUnreadable { .. }
                | RelayError::Abandoned
        )
    }
}

// ============================================================================
// Transport Error
// ============================================================================

/// Transport-level error type.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(reqwest::Error),

    /// Connection could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Timeout.
    #[error("Request timed out")]
    Timeout,

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid proxy configuration.
    #[error("Invalid proxy: {0}")]
    Proxy(String),

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries the API key as a query parameter.
        let err = err.without_url();
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err)
        }
    }
}
