//! Deterministic scoring: normalization, criterion evaluation, the two score
//! modes, and the score → color banding.
//!
//! A criterion is matched iff ANY of its patterns matches the normalized
//! text. Matching runs on the normalized copy only; highlighting re-runs on
//! the original so case and whitespace survive for display.

use crate::grade::criteria::CriteriaSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Base offset of the base-plus-density mode.
pub const BASE_SCORE: u32 = 30;
const KEYWORD_SPAN: f64 = 50.0;
const CRITERIA_SPAN: f64 = 20.0;

static WS_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("whitespace regex"));

/// Lowercase, collapse runs of 2+ whitespace to one space, flatten remaining
/// line breaks, trim.
pub fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();
    let collapsed = WS_RUN.replace_all(&lowered, " ");
    collapsed.replace(['\n', '\r'], " ").trim().to_string()
}

/// Per-run result for one criterion. Definitions stay immutable; matches live
/// here, one `Evaluation` per grading call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionOutcome {
    pub name: String,
    pub matched: bool,
    pub weight: u32,
    /// How many of the criterion's patterns matched individually (the
    /// base-density mode counts these across the whole set).
    pub pattern_hits: usize,
}

/// Outcomes in criteria order plus the set-wide pattern tallies.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub outcomes: Vec<CriterionOutcome>,
    pub pattern_hits: usize,
    pub total_patterns: usize,
}

impl Evaluation {
    pub fn matched_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.matched).count()
    }

    pub fn matched_weight(&self) -> u32 {
        self.outcomes
            .iter()
            .filter(|o| o.matched)
            .map(|o| o.weight)
            .sum()
    }
}

/// Evaluate every criterion independently against the normalized text.
pub fn evaluate(normalized: &str, set: &CriteriaSet) -> Evaluation {
    let mut outcomes = Vec::with_capacity(set.len());
    let mut pattern_hits = 0usize;
    let mut total_patterns = 0usize;

    for criterion in set.iter() {
        let mut hits = 0usize;
        for re in criterion.patterns() {
            total_patterns += 1;
            if re.is_match(normalized) {
                hits += 1;
            }
        }
        pattern_hits += hits;
        outcomes.push(CriterionOutcome {
            name: criterion.name().to_string(),
            matched: hits > 0,
            weight: criterion.weight(),
            pattern_hits: hits,
        });
    }

    Evaluation {
        outcomes,
        pattern_hits,
        total_patterns,
    }
}

/// The two supported scoring modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMode {
    /// `min(100, sum of matched weights)`, no base offset.
    WeightedSum,
    /// `floor(min(100, 30 + keyword_density*50 + criteria_density*20))`.
    /// Rewards partial keyword hits and floors any non-empty input at 30.
    BaseDensity,
}

impl ScoringMode {
    /// Weighted-sum when the set is designed to sum to 100, base-density
    /// otherwise.
    pub fn default_for(set: &CriteriaSet) -> Self {
        if set.total_weight() == 100 {
            Self::WeightedSum
        } else {
            Self::BaseDensity
        }
    }
}

/// Compute the integer score in [0, 100] for a finished evaluation.
pub fn score(eval: &Evaluation, mode: ScoringMode) -> u32 {
    match mode {
        ScoringMode::WeightedSum => eval.matched_weight().min(100),
        ScoringMode::BaseDensity => {
            // Zero counts are a degenerate configuration, not an error:
            // densities fall back to zero instead of dividing by zero.
            let keyword_density = if eval.total_patterns == 0 {
                0.0
            } else {
                eval.pattern_hits as f64 / eval.total_patterns as f64
            };
            let criteria_density = if eval.outcomes.is_empty() {
                0.0
            } else {
                eval.matched_count() as f64 / eval.outcomes.len() as f64
            };
            let raw =
                f64::from(BASE_SCORE) + keyword_density * KEYWORD_SPAN + criteria_density * CRITERIA_SPAN;
            raw.min(100.0).floor() as u32
        }
    }
}

/// Severity color of a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreColor {
    Green,
    Yellow,
    Red,
}

impl ScoreColor {
    /// Hex used by the score badge.
    pub fn hex(self) -> &'static str {
        match self {
            ScoreColor::Green => "#4CAF50",
            ScoreColor::Yellow => "#FFC107",
            ScoreColor::Red => "#F44336",
        }
    }
}

/// Three-band score classification with configurable thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorBands {
    pub green_min: u32,
    pub yellow_min: u32,
}

impl ColorBands {
    /// green >= 50, yellow >= 30.
    pub fn standard() -> Self {
        Self {
            green_min: 50,
            yellow_min: 30,
        }
    }

    /// green >= 80, yellow >= 50.
    pub fn strict() -> Self {
        Self {
            green_min: 80,
            yellow_min: 50,
        }
    }

    /// Keep a valid ladder: thresholds capped at 100, swapped if inverted.
    pub fn sanitized(self) -> Self {
        let mut green = self.green_min.min(100);
        let mut yellow = self.yellow_min.min(100);
        if yellow > green {
            std::mem::swap(&mut green, &mut yellow);
        }
        Self {
            green_min: green,
            yellow_min: yellow,
        }
    }

    pub fn classify(&self, score: u32) -> ScoreColor {
        if score >= self.green_min {
            ScoreColor::Green
        } else if score >= self.yellow_min {
            ScoreColor::Yellow
        } else {
            ScoreColor::Red
        }
    }
}

impl Default for ColorBands {
    fn default() -> Self {
        Self::standard()
    }
}
