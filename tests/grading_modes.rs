//! Scoring-mode behavior over the built-in criteria sets.

use flowchart_grader::grade::{
    algorithm_review, flowchart_structure, grade, GradeOptions, ScoreColor, ScoringMode,
};

const FULL_COVERAGE: &str = "The flowchart starts at the start node and ends at the end node. \
Each node has an id number, node types include process and decision, arrows connect every step, \
decision branches cover yes and no, every label is readable, and the path flows from start to end.";

const NO_COVERAGE: &str = "zzz qqq www";

#[test]
fn weighted_sum_full_match_scores_exactly_100() {
    let report = grade(FULL_COVERAGE, &flowchart_structure(), &GradeOptions::default());
    assert_eq!(report.score, 100);
    assert_eq!(report.score_color, ScoreColor::Green);
    assert_eq!(report.per_criterion.len(), 7);
    assert!(report.per_criterion.iter().all(|c| c.matched));
}

#[test]
fn weighted_sum_no_match_scores_exactly_0() {
    let report = grade(NO_COVERAGE, &flowchart_structure(), &GradeOptions::default());
    assert_eq!(report.score, 0);
    assert_eq!(report.score_color, ScoreColor::Red);
    assert!(report.per_criterion.iter().all(|c| !c.matched));
}

#[test]
fn base_density_floors_any_nonempty_text_at_30() {
    let opts = GradeOptions {
        mode: Some(ScoringMode::BaseDensity),
        ..Default::default()
    };
    let report = grade(NO_COVERAGE, &flowchart_structure(), &opts);
    assert_eq!(report.score, 30);
    assert_eq!(report.score_color, ScoreColor::Yellow);
}

#[test]
fn base_density_partial_match_is_deterministic() {
    // "start" hits 2 of 21 patterns and 2 of 7 criteria:
    // floor(30 + 2/21*50 + 2/7*20) = 40.
    let opts = GradeOptions {
        mode: Some(ScoringMode::BaseDensity),
        ..Default::default()
    };
    let report = grade("start", &flowchart_structure(), &opts);
    assert_eq!(report.score, 40);
}

#[test]
fn per_criterion_messages_use_configured_templates() {
    let report = grade(
        "The start and end are clear.",
        &flowchart_structure(),
        &GradeOptions::default(),
    );
    let s1 = &report.per_criterion[0];
    assert_eq!(s1.name, "S1: Start-End Node Check");
    assert!(s1.matched);
    assert_eq!(s1.message, "Start and end nodes mentioned");

    let s4 = &report.per_criterion[3];
    assert!(!s4.matched);
    assert_eq!(s4.message, "Node connections not addressed");
}

#[test]
fn summary_line_follows_the_band() {
    let green = grade(FULL_COVERAGE, &flowchart_structure(), &GradeOptions::default());
    assert!(green.summary.starts_with("Overall: Good"));
    let red = grade(NO_COVERAGE, &flowchart_structure(), &GradeOptions::default());
    assert!(red.summary.contains("needs more detail"));
}

#[test]
fn algorithm_set_covers_all_five_criteria() {
    let text = "The program begins, declares a variable, loops while printing output, \
and follows proper steps throughout.";
    let report = grade(text, &algorithm_review(), &GradeOptions::default());
    assert_eq!(report.score, 100);
    assert!(report.per_criterion.iter().all(|c| c.matched));
}
