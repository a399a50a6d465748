//! Core error types for `GemRelay`.

use thiserror::Error;

/// Core error type for `GemRelay` models and repair helpers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The response envelope carried no candidate text.
    #[error("Response has no candidate text")]
    NoCandidateText,

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
