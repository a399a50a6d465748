//! Domain models for GemRelay.
//!
//! ## Submodules
//!
//! - [`credential`] - Pooled API keys and the leases handed to callers
//! - [`request`] - Outbound `generateContent` request body
//! - [`envelope`] - Response envelope returned by the API

mod credential;
mod envelope;
mod request;

pub use credential::{mask_key, Credential, CredentialLease};
pub use envelope::{
    Candidate, CandidateContent, CandidatePart, ResultEnvelope, SafetyRating, UsageMetadata,
};
pub use request::{
    GenerateRequest, GenerationConfig, RequestContent, RequestPart, SafetySetting,
    RESPONSE_MIME_TYPE,
};
