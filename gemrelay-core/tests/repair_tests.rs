//! Integration tests for response repair on realistic model answers.

use gemrelay_core::repair::{
    extract_fallback_text, extract_fenced_block, extract_json_block, unescape_recovered_text,
};
use gemrelay_core::ResultEnvelope;

#[test]
fn test_repaired_envelope_text_parses() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"```json\n{\"name\": \"Aldric\",  \"trade\": \"smith\"}\n```"}],"role":"model"},"finishReason":"STOP","index":0,"safetyRatings":[]}]}"#;

    let repaired = extract_json_block(body);
    let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();

    assert_eq!(value["name"], "Aldric");
    assert_eq!(value["trade"], "smith");
}

#[test]
fn test_fenced_answer_without_envelope() {
    let answer = "```json\n{\"quest\": \"Find the ring\"}\n```";
    assert_eq!(extract_json_block(answer), r#"{"quest": "Find the ring"}"#);
}

#[test]
fn test_fallback_when_json_is_broken() {
    let answer = r#"...text: "hola", finish: STOP"#;
    let repaired = extract_json_block(answer);
    assert!(serde_json::from_str::<serde_json::Value>(&repaired).is_err());
    assert_eq!(extract_fallback_text(answer).as_deref(), Some("hola"));
}

#[test]
fn test_yaml_recovered_from_envelope() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"```yaml\ngreeting: \"Hola\"\nfarewell: Adiós\n```"}]}}]}"#;

    let block = extract_fenced_block(body, "yaml").unwrap();
    let text = unescape_recovered_text(&block);

    // The fence body still carries the escaped newlines around it.
    assert_eq!(text.trim(), "greeting: \"Hola\"\nfarewell: Adiós");
}

#[test]
fn test_envelope_first_text_matches_fenced_extraction() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"```yaml\nkey: value\n```"}]}}]}"#;
    let envelope = ResultEnvelope::from_body(body).unwrap();

    let direct = extract_fenced_block(envelope.first_text().unwrap(), "yaml").unwrap();
    let raw = unescape_recovered_text(&extract_fenced_block(body, "yaml").unwrap());

    assert_eq!(direct, raw.trim());
}
