// src/grade/mod.rs
//! Grading pipeline entry: normalize → evaluate → score → feedback → annotate.

pub mod criteria;
pub mod feedback;
pub mod highlight;
pub mod scoring;

// Re-export convenient types.
pub use criteria::{
    algorithm_review, flowchart_structure, load_criteria_file, CriteriaSet, Criterion,
    HotReloadCriteria,
};
pub use feedback::CriterionFeedback;
pub use scoring::{normalize, ColorBands, Evaluation, ScoreColor, ScoringMode};

use serde::Serialize;
use tracing::debug;

/// Caller-tunable knobs for one grading run.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradeOptions {
    /// `None` picks weighted-sum for sets whose weights sum to 100,
    /// base-density otherwise.
    pub mode: Option<ScoringMode>,
    pub bands: ColorBands,
}

/// Full grading result for one response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingReport {
    pub score: u32,
    pub score_color: ScoreColor,
    pub per_criterion: Vec<CriterionFeedback>,
    /// Trailing summary line keyed by the final band.
    pub summary: String,
    pub annotated_text: String,
}

/// Grade `text` against `set`. Total over any input: empty or whitespace-only
/// text yields a zero score and an empty feedback list, never an error.
pub fn grade(text: &str, set: &CriteriaSet, opts: &GradeOptions) -> GradingReport {
    let bands = opts.bands.sanitized();

    if text.trim().is_empty() {
        let color = bands.classify(0);
        return GradingReport {
            score: 0,
            score_color: color,
            per_criterion: Vec::new(),
            summary: feedback::overall_summary(color).to_string(),
            annotated_text: String::new(),
        };
    }

    let normalized = scoring::normalize(text);
    let eval = scoring::evaluate(&normalized, set);
    let mode = opts.mode.unwrap_or_else(|| ScoringMode::default_for(set));
    let score = scoring::score(&eval, mode);
    let color = bands.classify(score);

    debug!(
        target: "grade",
        score,
        ?mode,
        matched = eval.matched_count(),
        criteria = set.len(),
        "graded response"
    );

    GradingReport {
        score,
        score_color: color,
        per_criterion: feedback::per_criterion(set, &eval),
        summary: feedback::overall_summary(color).to_string(),
        annotated_text: highlight::annotate(text, set, &eval),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_grades_to_zero_without_error() {
        let report = grade("", &flowchart_structure(), &GradeOptions::default());
        assert_eq!(report.score, 0);
        assert_eq!(report.score_color, ScoreColor::Red);
        assert!(report.per_criterion.is_empty());
        assert!(report.annotated_text.is_empty());

        let report = grade("   \n  ", &flowchart_structure(), &GradeOptions::default());
        assert_eq!(report.score, 0);
    }

    #[test]
    fn report_serializes_with_contract_field_names() {
        let report = grade("start to end", &flowchart_structure(), &GradeOptions::default());
        let v = serde_json::to_value(&report).unwrap();
        assert!(v.get("score").is_some());
        assert!(v.get("scoreColor").is_some());
        assert!(v.get("perCriterion").is_some());
        assert!(v.get("annotatedText").is_some());
    }

    #[test]
    fn explicit_mode_overrides_default_selection() {
        // Flowchart set sums to 100 → default weighted-sum; force base-density.
        let text = "zzz qqq www";
        let weighted = grade(text, &flowchart_structure(), &GradeOptions::default());
        assert_eq!(weighted.score, 0);

        let opts = GradeOptions {
            mode: Some(ScoringMode::BaseDensity),
            ..Default::default()
        };
        let density = grade(text, &flowchart_structure(), &opts);
        assert_eq!(density.score, 30);
    }
}
