//! Generative Output Scrubbing
//!
//! The service wraps output in markdown code fences and mixes JSON with
//! prose. This module owns the one contract every call site relies on:
//! strip known wrapper syntax, then attempt a structured parse; on failure
//! the caller falls back, never crashes.

use serde_json::Value;
use tracing::debug;

use crate::types::{LoomError, Result};

/// Remove a markdown code-fence wrapper (```html ... ``` or ``` ... ```)
/// from generated text. Unfenced text passes through unchanged apart from
/// trimming.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the language tag line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };

    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim().to_string()
}

/// Extract a JSON value from a generative response.
///
/// Strips fence wrappers and a BOM, attempts a direct parse, then falls back
/// to the outermost `{...}` or `[...]` slice for JSON embedded in prose.
pub fn extract_json(raw: &str) -> Result<Value> {
    let cleaned = strip_code_fences(raw);
    let cleaned = cleaned.trim_start_matches('\u{feff}').trim();

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Ok(value);
    }

    debug!("Direct JSON parse failed, trying embedded slice");
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (cleaned.find(open), cleaned.rfind(close))
            && start < end
            && let Ok(value) = serde_json::from_str::<Value>(&cleaned[start..=end])
        {
            return Ok(value);
        }
    }

    Err(LoomError::Generation(format!(
        "response is not valid JSON. Content preview: {}",
        cleaned.chars().take(200).collect::<String>()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_language_tag() {
        let raw = "```html\n<h1>Title</h1>\n```";
        assert_eq!(strip_code_fences(raw), "<h1>Title</h1>");
    }

    #[test]
    fn test_strip_fences_bare() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_unfenced_is_noop() {
        assert_eq!(strip_code_fences("  plain text  "), "plain text");
    }

    #[test]
    fn test_extract_json_direct() {
        let value = extract_json("{\"k\": \"v\"}").unwrap();
        assert_eq!(value["k"], "v");
    }

    #[test]
    fn test_extract_json_fenced() {
        let value = extract_json("```json\n[\"a\", \"b\"]\n```").unwrap();
        assert_eq!(value[1], "b");
    }

    #[test]
    fn test_extract_json_embedded_in_prose() {
        let raw = "Here are your keywords:\n{\"keywords\": [\"x\"]}\nHope that helps!";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["keywords"][0], "x");
    }

    #[test]
    fn test_extract_json_failure_is_generation_error() {
        assert!(matches!(
            extract_json("no json here"),
            Err(LoomError::Generation(_))
        ));
    }
}
