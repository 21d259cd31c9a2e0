// src/extract.rs
//! Salvage helpers for answers that were asked to contain JSON.
//!
//! Vision models wrap the requested JSON object in prose or chain-of-thought,
//! leave code fences around it, or forget to escape interior quotes. These
//! helpers cut out the embedded block, scrub the common damage, and only
//! then parse. All of them are total; a hopeless payload yields `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

static TRAILING_COMMA_OBJ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*\}").expect("trailing comma regex"));
static TRAILING_COMMA_ARR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*\]").expect("trailing comma regex"));

/// Substring between the first `{` and the last `}`, inclusive.
pub fn json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start <= end).then(|| &text[start..=end])
}

/// Substring between the first `[` and the last `]`, inclusive.
pub fn array_block(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start <= end).then(|| &text[start..=end])
}

/// Strip code fences and trailing commas before the closing brace/bracket.
pub fn scrub(raw: &str) -> String {
    let unfenced = raw.replace("```", "");
    let stripped = unfenced.trim();
    let no_obj_commas = TRAILING_COMMA_OBJ.replace_all(stripped, "}");
    TRAILING_COMMA_ARR
        .replace_all(&no_obj_commas, "]")
        .into_owned()
}

/// Heuristically escape unescaped double quotes inside string values.
///
/// Inside a value, a quote is taken as the closing one only when the next
/// non-space character is a JSON delimiter (`,`, `}`, `]`, `:`); any other
/// quote is treated as interior and escaped.
pub fn fix_unescaped_quotes(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len() + 8);
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace()).copied();
                match next {
                    None | Some(',') | Some('}') | Some(']') | Some(':') => {
                        in_string = false;
                        out.push('"');
                    }
                    _ => {
                        // Interior quote the model forgot to escape.
                        out.push('\\');
                        out.push('"');
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Pull one JSON object out of free text: block extraction, scrub, direct
/// parse, then the quote repair as a last resort.
pub fn parse_embedded_object(text: &str) -> Option<Value> {
    let block = json_block(text)?;
    let scrubbed = scrub(block);
    match serde_json::from_str(&scrubbed) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(target: "extract", error = %e, "direct parse failed, repairing quotes");
            serde_json::from_str(&fix_unescaped_quotes(&scrubbed)).ok()
        }
    }
}
