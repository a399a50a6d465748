//! Gemini `generateContent` response envelope.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Top-level response from the `generateContent` endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    /// Generated candidates.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Token accounting.
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

/// A generated candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content.
    pub content: CandidateContent,

    /// Why generation stopped (e.g., "STOP").
    #[serde(default)]
    pub finish_reason: Option<String>,

    /// Candidate index.
    #[serde(default)]
    pub index: u32,

    /// Safety ratings.
    #[serde(default)]
    pub safety_ratings: Vec<SafetyRating>,
}

/// Content of a candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandidateContent {
    /// Text parts.
    #[serde(default)]
    pub parts: Vec<CandidatePart>,

    /// Author role (usually "model").
    #[serde(default)]
    pub role: Option<String>,
}

/// A text part of a candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandidatePart {
    /// Generated text.
    #[serde(default)]
    pub text: String,
}

/// A safety rating.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SafetyRating {
    /// Harm category.
    pub category: String,
    /// Rated probability.
    pub probability: String,
}

/// Token usage of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_token_count: u64,
    /// Tokens across candidates.
    #[serde(default)]
    pub candidates_token_count: u64,
    /// Total tokens.
    #[serde(default)]
    pub total_token_count: u64,
}

impl ResultEnvelope {
    /// Parses an envelope from a raw response body.
    pub fn from_body(body: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Returns the text of the first part of the first candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
    }

    /// Like [`Self::first_text`], but an error when there is no text.
    pub fn require_text(&self) -> Result<&str, CoreError> {
        self.first_text().ok_or(CoreError::NoCandidateText)
    }

    /// Returns total token usage, if reported.
    pub fn total_tokens(&self) -> Option<u64> {
        self.usage_metadata.map(|u| u.total_token_count)
    }
}
