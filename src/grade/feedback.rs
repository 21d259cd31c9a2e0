//! Human-readable feedback lines for a finished evaluation.

use crate::grade::criteria::CriteriaSet;
use crate::grade::scoring::{Evaluation, ScoreColor};
use serde::Serialize;

/// One pass/fail line per criterion, in criteria order.
#[derive(Debug, Clone, Serialize)]
pub struct CriterionFeedback {
    pub name: String,
    pub matched: bool,
    pub message: String,
}

/// Pair every outcome with its criterion's positive/negative template.
pub fn per_criterion(set: &CriteriaSet, eval: &Evaluation) -> Vec<CriterionFeedback> {
    set.iter()
        .zip(eval.outcomes.iter())
        .map(|(criterion, outcome)| CriterionFeedback {
            name: outcome.name.clone(),
            matched: outcome.matched,
            message: criterion.feedback_for(outcome.matched).to_string(),
        })
        .collect()
}

/// Trailing summary line keyed by the final score band.
pub fn overall_summary(color: ScoreColor) -> &'static str {
    match color {
        ScoreColor::Green => "Overall: Good response that covers basic requirements",
        ScoreColor::Yellow => "Overall: Acceptable response with some relevant points",
        ScoreColor::Red => "Overall: Response needs more detail about the flowchart",
    }
}
