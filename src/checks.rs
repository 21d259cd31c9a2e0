// src/checks.rs
//! Structured check extraction from rubric-style model output.
//!
//! The evaluation prompt asks the model to end its answer with plain lines
//! like `LT_1: True`, `PT_4: False` and `TOTAL_SCORE: 7/10`. This module
//! pulls those back out of the free text. Matching is case-sensitive on
//! purpose: the rubric fixes the exact spelling, and loose matches would
//! pick up the model's own prose.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static CHECK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(LT_\d+|PT_\d+):\s*(True|False)").expect("check regex"));
static TOTAL_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"TOTAL_SCORE:\s*(\d+(?:\.\d+)?)/10").expect("total score regex"));

/// Ordered check outcomes plus the self-reported total, if any.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    /// Check id → outcome, in first-appearance order. A repeated id
    /// overwrites its earlier outcome in place.
    pub checks: Vec<(String, bool)>,
    /// Self-reported score on the 0–10 scale, as written by the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f32>,
}

impl CheckReport {
    pub fn get(&self, id: &str) -> Option<bool> {
        self.checks
            .iter()
            .find(|(name, _)| name == id)
            .map(|(_, v)| *v)
    }

    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|(_, v)| *v).count()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty() && self.total_score.is_none()
    }
}

/// Extract every `LT_n`/`PT_n` outcome and the `TOTAL_SCORE` line.
pub fn extract_checks(text: &str) -> CheckReport {
    let mut report = CheckReport::default();

    for caps in CHECK_LINE.captures_iter(text) {
        let id = caps[1].to_string();
        let value = &caps[2] == "True";
        match report.checks.iter_mut().find(|(name, _)| *name == id) {
            Some(entry) => entry.1 = value,
            None => report.checks.push((id, value)),
        }
    }

    report.total_score = TOTAL_SCORE
        .captures(text)
        .and_then(|caps| caps[1].parse::<f32>().ok());

    report
}
