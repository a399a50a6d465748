//! Outbound `generateContent` request body.

use serde::{Deserialize, Serialize};

/// MIME type requested from the model.
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Safety category sent with every request.
const SAFETY_CATEGORY: &str = "7";

/// Safety threshold sent with every request.
const SAFETY_THRESHOLD: &str = "4";

// ============================================================================
// Request Body
// ============================================================================

/// Request body for the `generateContent` endpoint.
///
/// Serializing through serde takes care of escaping the prompt text for
/// transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Prompt contents (always a single entry).
    pub contents: Vec<RequestContent>,
    /// Safety policy block.
    pub safety_settings: Vec<SafetySetting>,
    /// Sampling configuration.
    pub generation_config: GenerationConfig,
}

/// One content entry of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContent {
    /// Text parts.
    pub parts: Vec<RequestPart>,
}

/// One text part of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPart {
    /// Prompt text.
    pub text: String,
}

/// A safety-policy entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    /// Harm category code.
    pub category: String,
    /// Block threshold code.
    pub threshold: String,
}

impl Default for SafetySetting {
    fn default() -> Self {
        Self {
            category: SAFETY_CATEGORY.to_string(),
            threshold: SAFETY_THRESHOLD.to_string(),
        }
    }
}

/// Generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Requested response MIME type.
    pub response_mime_type: String,
    /// Sampling temperature.
    pub temperature: f64,
}

impl GenerateRequest {
    /// Builds a request for a single prompt with the fixed safety block.
    pub fn new(prompt: impl Into<String>, temperature: f64) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.into(),
                }],
            }],
            safety_settings: vec![SafetySetting::default()],
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE.to_string(),
                temperature,
            },
        }
    }

    /// Returns the prompt text of the first part.
    pub fn prompt(&self) -> Option<&str> {
        self.contents
            .first()
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
    }
}
