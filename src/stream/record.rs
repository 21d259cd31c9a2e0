//! NDJSON record model and the per-fragment decode pipeline.
//!
//! One model record per line:
//! `{ "message": { "content": "..." }, "metadata": { ... }, "error": "..." }`.
//! Unknown fields are ignored. A fragment that fails to parse goes through a
//! best-effort inline-content recovery before being dropped; a single
//! malformed record never aborts the run.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One decoded unit of model output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StreamRecord {
    #[serde(default)]
    pub message: Option<RecordMessage>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecordMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Outcome of decoding one raw fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// The fragment parsed as a complete record.
    Decoded(StreamRecord),
    /// The fragment was malformed, but an inline `"content"` field was salvaged.
    Recovered(String),
    /// Nothing usable; the fragment is discarded.
    Dropped,
}

// Inline `"content": "<text>"`, closing quote required. Escaped quotes inside
// the value are allowed; a value cut off mid-string never matches.
static INLINE_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)"content"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("inline content regex")
});

/// Decode one raw fragment (a single line, or an unterminated tail).
pub fn decode_fragment(raw: &str) -> DecodeOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DecodeOutcome::Dropped;
    }
    match serde_json::from_str::<StreamRecord>(trimmed) {
        Ok(rec) => DecodeOutcome::Decoded(rec),
        Err(_) => match INLINE_CONTENT.captures(trimmed) {
            Some(caps) => DecodeOutcome::Recovered(unescape_fragment(&caps[1])),
            None => DecodeOutcome::Dropped,
        },
    }
}

/// Undo the JSON string escapes the recovery capture can legally contain.
/// Unknown escapes are kept verbatim.
fn unescape_fragment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_content_record() {
        let out = decode_fragment(r#"{"message":{"content":"Hello"}}"#);
        match out {
            DecodeOutcome::Decoded(rec) => {
                assert_eq!(rec.message.unwrap().content.as_deref(), Some("Hello"));
                assert!(rec.error.is_none());
            }
            other => panic!("expected Decoded, got {:?}", other),
        }
    }

    #[test]
    fn decodes_error_record() {
        let out = decode_fragment(r#"{"error":"model overloaded"}"#);
        match out {
            DecodeOutcome::Decoded(rec) => {
                assert_eq!(rec.error.as_deref(), Some("model overloaded"));
            }
            other => panic!("expected Decoded, got {:?}", other),
        }
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let out =
            decode_fragment(r#"{"model":"llava","done":false,"message":{"content":"x","role":"assistant"}}"#);
        assert!(matches!(out, DecodeOutcome::Decoded(_)));
    }

    #[test]
    fn recovers_inline_content_with_closing_quote() {
        // Truncated record, but the content value itself is complete.
        let out = decode_fragment(r#"{"message":{"content":"partial text""#);
        assert_eq!(out, DecodeOutcome::Recovered("partial text".to_string()));
    }

    #[test]
    fn drops_content_cut_mid_string() {
        // No closing quote: the capture must not fire.
        let out = decode_fragment(r#"{"message":{"content":"partial"#);
        assert_eq!(out, DecodeOutcome::Dropped);
    }

    #[test]
    fn drops_garbage_and_blank() {
        assert_eq!(decode_fragment("not json at all"), DecodeOutcome::Dropped);
        assert_eq!(decode_fragment("   "), DecodeOutcome::Dropped);
        assert_eq!(decode_fragment("42"), DecodeOutcome::Dropped);
    }

    #[test]
    fn recovered_text_is_unescaped() {
        let out = decode_fragment(r#"{"message":{"content":"a \"b\"\nc" oops"#);
        assert_eq!(out, DecodeOutcome::Recovered("a \"b\"\nc".to_string()));
    }
}
