//! Typed decoding of model answers.
//!
//! A bounded request is generic over the shape it expects back. The shape
//! decides how a repaired JSON block turns into a value and whether plain
//! text recovered by the fallback is acceptable.

use gemrelay_core::repair::{extract_fallback_text, extract_json_block};
use gemrelay_core::ResultEnvelope;
use serde::de::DeserializeOwned;

use crate::error::RelayError;

/// A result shape a request can be decoded into.
pub trait ResponseShape: Sized + Send + 'static {
    /// Parses the repaired JSON block.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the block does not fit this shape.
    fn parse(repaired: &str) -> Result<Self, serde_json::Error>;

    /// Builds a value from fallback text. Only plain-text shapes accept it.
    fn from_text(_text: String) -> Option<Self> {
        None
    }

    /// Builds a value straight from a well-formed response envelope.
    ///
    /// Tried before any repair. Shapes that need a JSON answer leave this
    /// as `None`.
    fn from_envelope(_envelope: &ResultEnvelope) -> Option<Self> {
        None
    }
}

impl ResponseShape for String {
    fn parse(repaired: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(repaired)
    }

    fn from_text(text: String) -> Option<Self> {
        Some(text)
    }
}

impl ResponseShape for serde_json::Value {
    fn parse(repaired: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(repaired)
    }
}

/// The candidate text of a response, taken as is.
///
/// A JSON string answer is unquoted; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(pub String);

impl Text {
    /// Unwraps the answer text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ResponseShape for Text {
    fn parse(repaired: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(repaired).map(Text)
    }

    fn from_text(text: String) -> Option<Self> {
        Some(Text(text))
    }

    fn from_envelope(envelope: &ResultEnvelope) -> Option<Self> {
        let text = envelope.require_text().ok()?.trim();
        let text = serde_json::from_str::<String>(text).unwrap_or_else(|_| text.to_string());
        Some(Text(text))
    }
}

/// Wrapper decoding any deserializable type.
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct Npc { name: String, trade: String }
///
/// pipeline.submit(prompt, |Json(npc): Json<Npc>| { ... }, |err| { ... });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwraps the decoded value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> ResponseShape for Json<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn parse(repaired: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(repaired).map(Json)
    }
}

/// Decodes a raw response body into `T`.
///
/// Shapes that read the envelope directly get the first chance. Otherwise
/// the body is repaired; if that does not parse, the `text: "..."` fallback
/// is offered to shapes that accept plain text.
///
/// # Errors
///
/// Returns [`RelayError::MalformedResponse`] when no path works.
pub fn decode<T: ResponseShape>(raw: &str) -> Result<T, RelayError> {
    if let Some(value) = ResultEnvelope::from_body(raw)
        .ok()
        .and_then(|envelope| T::from_envelope(&envelope))
    {
        return Ok(value);
    }

    let repaired = extract_json_block(raw);

    match T::parse(&repaired) {
        Ok(value) => Ok(value),
        Err(parse_error) => extract_fallback_text(raw)
            .and_then(T::from_text)
            .ok_or_else(|| RelayError::MalformedResponse(parse_error.to_string())),
    }
}
