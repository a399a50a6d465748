//! Best-effort repair of model output.
//!
//! Models asked for JSON frequently wrap it in Markdown fences, double-escape
//! quotes, or leak the JSON-encoded form of their own text into the answer.
//! The helpers here raise the odds that the result parses; none of them
//! guarantees valid output.

use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// Regex Patterns
// ============================================================================

/// A single flat JSON object (no nested braces).
static FLAT_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]*\}").expect("Invalid regex"));

/// Two or more whitespace characters.
static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("Invalid regex"));

/// `text: "<content>"` followed by a comma or a closing brace.
static FALLBACK_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"text:\s*"(.*?)"\s*[,}]"#).expect("Invalid regex"));

/// One or more backslashes before `n`.
static ESCAPED_NEWLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\+n").expect("Invalid regex"));

/// One or more backslashes before a double quote.
static ESCAPED_QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\+""#).expect("Invalid regex"));

// ============================================================================
// JSON Extraction
// ============================================================================

/// Isolates a JSON object in noisy model output and normalizes it.
///
/// The first flat object (`{...}` without nested braces) is taken; when
/// there is none the whole input is kept. The text then goes through, in
/// order: fence stripping, quote un-escaping, escaped-newline removal,
/// whitespace collapsing and ellipsis normalization.
pub fn extract_json_block(text: &str) -> String {
    let block = FLAT_OBJECT_RE
        .find(text)
        .map_or(text, |m| m.as_str());

    let stripped = block
        .replace("```json", "")
        .replace("```", "")
        .replace("\\\"", "\"")
        .replace("\\n", "")
        .replace("\\\n", "");

    let collapsed = WHITESPACE_RUN_RE.replace_all(&stripped, " ");
    let ellipsis = collapsed.replace('\u{2026}', "...");

    space_after_ellipsis(&ellipsis).trim().to_string()
}

/// Inserts a space after `...` when a non-space character follows directly.
fn space_after_ellipsis(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text;

    while let Some(pos) = rest.find("...") {
        out.push_str(&rest[..pos]);
        out.push_str("...");
        rest = &rest[pos + 3..];

        if rest.chars().next().is_some_and(|c| !c.is_whitespace()) {
            out.push(' ');
        }
    }

    out.push_str(rest);
    out
}

// ============================================================================
// Fallback Extraction
// ============================================================================

/// Extracts the content of a `text: "<content>"` pair.
///
/// Used when structured parsing failed but the answer still carries a
/// recognizable text field.
pub fn extract_fallback_text(text: &str) -> Option<String> {
    FALLBACK_TEXT_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Returns the trimmed body of the first fenced block tagged `lang`.
///
/// ```
/// use gemrelay_core::repair::extract_fenced_block;
///
/// let answer = "Here you go:\n```yaml\ngreeting: Hola\n```";
/// assert_eq!(extract_fenced_block(answer, "yaml").as_deref(), Some("greeting: Hola"));
/// ```
pub fn extract_fenced_block(text: &str, lang: &str) -> Option<String> {
    let pattern = format!(r"```{}([\s\S]*?)```", regex::escape(lang));
    let re = Regex::new(&pattern).ok()?;

    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

// ============================================================================
// Escaping
// ============================================================================

/// Escapes text for embedding inside a JSON string literal.
pub fn escape_for_transport(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Recovers literal newlines and quotes from inconsistently escaped text.
///
/// Any run of backslashes before `n` becomes a newline and any run before
/// `"` becomes a bare quote, so double- and triple-escaped input collapses
/// the same way single-escaped input does. This is not a strict unescape.
pub fn unescape_recovered_text(text: &str) -> String {
    let newlines = ESCAPED_NEWLINE_RE.replace_all(text, "\n");
    ESCAPED_QUOTE_RE.replace_all(&newlines, "\"").into_owned()
}
