// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `GemRelay` Core
//!
//! Core types and pure helpers for the `GemRelay` client.
//!
//! This crate provides the foundational pieces used across the other
//! `GemRelay` crates:
//!
//! - Domain models (credentials, request body, response envelope)
//! - Error types
//! - Response repair helpers
//!
//! ## Key Types
//!
//! ### Credentials
//! - [`Credential`] - Pooled API key with usage state
//! - [`CredentialLease`] - Read-only copy handed out per attempt
//!
//! ### Wire Types
//! - [`GenerateRequest`] - `generateContent` request body
//! - [`ResultEnvelope`] - `generateContent` response envelope
//!
//! ### Repair
//! - [`repair::extract_json_block`] - Isolate and normalize a JSON object
//! - [`repair::extract_fallback_text`] - Pull a `text: "..."` value
//! - [`repair::unescape_recovered_text`] - Tolerant unescape

pub mod error;
pub mod models;
pub mod repair;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Credentials
    mask_key,
    Credential,
    CredentialLease,
    // Request
    GenerateRequest,
    GenerationConfig,
    RequestContent,
    RequestPart,
    SafetySetting,
    RESPONSE_MIME_TYPE,
    // Response
    Candidate,
    CandidateContent,
    CandidatePart,
    ResultEnvelope,
    SafetyRating,
    UsageMetadata,
};
