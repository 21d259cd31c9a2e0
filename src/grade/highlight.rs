//! HTML annotation of the original-case response text.
//!
//! Matched criterion patterns are wrapped in highlight spans carrying the
//! criterion name as a title. A fixed vocabulary of structural terms is
//! emphasized afterwards, never inside an existing span. Raw text segments
//! are escaped and line breaks become `<br/>`, so the produced markup is
//! well-formed on its own.

use crate::grade::criteria::CriteriaSet;
use crate::grade::scoring::Evaluation;
use html_escape::{encode_double_quoted_attribute, encode_text};
use once_cell::sync::Lazy;
use regex::Regex;

// Terms that always render emphasized, matched criterion or not.
static EMPHASIS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(start|end|node|edge|decision|process|label)\b").expect("emphasis regex")
});

#[derive(Debug, Clone, Copy)]
enum MarkKind {
    /// Index of the owning criterion in the set.
    Highlight(usize),
    Emphasis,
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    start: usize,
    end: usize,
    kind: MarkKind,
}

fn overlaps(marks: &[Mark], start: usize, end: usize) -> bool {
    marks.iter().any(|m| m.start < end && start < m.end)
}

/// Annotate `original` with highlight and emphasis markup. Matching re-runs
/// on the original text (not the normalized copy) so case and whitespace are
/// preserved for display. A span taken first wins; nothing is wrapped twice.
pub fn annotate(original: &str, set: &CriteriaSet, eval: &Evaluation) -> String {
    let mut marks: Vec<Mark> = Vec::new();

    for (idx, (criterion, outcome)) in set.iter().zip(eval.outcomes.iter()).enumerate() {
        if !outcome.matched {
            continue;
        }
        for re in criterion.patterns() {
            for m in re.find_iter(original) {
                if m.start() == m.end() || overlaps(&marks, m.start(), m.end()) {
                    continue;
                }
                marks.push(Mark {
                    start: m.start(),
                    end: m.end(),
                    kind: MarkKind::Highlight(idx),
                });
            }
        }
    }

    for m in EMPHASIS.find_iter(original) {
        if overlaps(&marks, m.start(), m.end()) {
            continue;
        }
        marks.push(Mark {
            start: m.start(),
            end: m.end(),
            kind: MarkKind::Emphasis,
        });
    }

    marks.sort_by_key(|m| m.start);

    let mut out = String::with_capacity(original.len() + original.len() / 2);
    let mut cursor = 0usize;
    for mark in &marks {
        push_text(&mut out, &original[cursor..mark.start]);
        let inner = encode_text(&original[mark.start..mark.end]);
        match mark.kind {
            MarkKind::Highlight(idx) => {
                let title = encode_double_quoted_attribute(set.criteria()[idx].name());
                out.push_str("<span class=\"keyword-match\" title=\"");
                out.push_str(&title);
                out.push_str("\">");
                out.push_str(&inner);
                out.push_str("</span>");
            }
            MarkKind::Emphasis => {
                out.push_str("<strong>");
                out.push_str(&inner);
                out.push_str("</strong>");
            }
        }
        cursor = mark.end;
    }
    push_text(&mut out, &original[cursor..]);
    out
}

/// Escape a raw segment, turning line breaks into explicit `<br/>` markers.
fn push_text(out: &mut String, raw: &str) {
    for (i, part) in raw.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<br/>");
        }
        out.push_str(&encode_text(part.trim_end_matches('\r')));
    }
}
