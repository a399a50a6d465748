//! JSON output formatting.

use anyhow::Result;
use gemrelay_core::Credential;
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// Answer of an ask command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerOutput {
    /// Plain text answer.
    Text(String),
    /// Repaired JSON answer.
    Json(serde_json::Value),
}

/// A configured key, masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOutput {
    pub id: String,
    pub key: String,
}

impl From<&Credential> for KeyOutput {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id.clone(),
            key: credential.masked_key(),
        }
    }
}

#[derive(Serialize)]
struct AskOutput<'a> {
    prompt: &'a str,
    answer: &'a AnswerOutput,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a prompt together with its answer.
    pub fn format_answer(&self, prompt: &str, answer: &AnswerOutput) -> Result<String> {
        self.format(&AskOutput { prompt, answer })
    }
}
