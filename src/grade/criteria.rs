//! Criterion definitions: named, weighted sets of case-insensitive patterns.
//!
//! Definitions are immutable value records; evaluation never mutates them
//! (per-run matches live in [`crate::grade::scoring::Evaluation`]). Sets load
//! from JSON files shaped like `config/criteria/flowchart.json`:
//!
//! ```json
//! {
//!   "criteria": [
//!     { "name": "S1: ...", "patterns": ["start|end"], "weight": 20,
//!       "feedback": { "positive": "...", "negative": "..." } }
//!   ]
//! }
//! ```
//!
//! The file is re-read on mtime change when accessed through
//! [`HotReloadCriteria`].

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::SystemTime,
};

const DEFAULT_POSITIVE: &str = "Mentioned in the response";
const DEFAULT_NEGATIVE: &str = "Not addressed in the response";

/* ----------------------------
File schema (from JSON)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
struct CriteriaFile {
    criteria: Vec<CriterionCfg>,
}

#[derive(Debug, Clone, Deserialize)]
struct CriterionCfg {
    name: String,
    patterns: Vec<String>,
    weight: u32,
    #[serde(default)]
    feedback: Option<FeedbackCfg>,
}

#[derive(Debug, Clone, Deserialize)]
struct FeedbackCfg {
    positive: String,
    negative: String,
}

/* ----------------------------
Compiled definitions
---------------------------- */

/// One named, weighted rule. Patterns are compiled case-insensitive and OR-ed
/// at evaluation time.
#[derive(Debug, Clone)]
pub struct Criterion {
    name: String,
    patterns: Vec<Regex>,
    weight: u32,
    positive: String,
    negative: String,
}

impl Criterion {
    /// Compile a criterion. Weight must be a positive number of points; this
    /// is the caller-misconfiguration class of error, everything downstream
    /// is total.
    pub fn new(
        name: impl Into<String>,
        patterns: &[&str],
        weight: u32,
        positive: impl Into<String>,
        negative: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            anyhow::bail!("criterion with empty name");
        }
        if weight == 0 {
            anyhow::bail!("criterion `{name}` must have a positive weight");
        }
        if patterns.is_empty() {
            anyhow::bail!("criterion `{name}` has no patterns");
        }
        let patterns = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| anyhow::anyhow!("criterion `{name}` pattern error: {e}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            name,
            patterns,
            weight,
            positive: positive.into(),
            negative: negative.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Feedback template for the matched/unmatched state.
    pub fn feedback_for(&self, matched: bool) -> &str {
        if matched {
            &self.positive
        } else {
            &self.negative
        }
    }
}

/// Ordered, validated criteria. Order is the evaluation and report order.
#[derive(Debug, Clone, Default)]
pub struct CriteriaSet {
    criteria: Vec<Criterion>,
}

impl CriteriaSet {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    /// Parse and compile a JSON criteria file.
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let file: CriteriaFile = serde_json::from_str(raw).context("criteria JSON")?;
        let criteria = file
            .criteria
            .into_iter()
            .map(|cfg| {
                let refs: Vec<&str> = cfg.patterns.iter().map(String::as_str).collect();
                let (positive, negative) = match cfg.feedback {
                    Some(f) => (f.positive, f.negative),
                    None => (DEFAULT_POSITIVE.to_string(), DEFAULT_NEGATIVE.to_string()),
                };
                Criterion::new(cfg.name, &refs, cfg.weight, positive, negative)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self::new(criteria))
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Criterion> {
        self.criteria.iter()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Sum of all weights. Sets designed to sum to 100 get weighted-sum
    /// scoring by default.
    pub fn total_weight(&self) -> u32 {
        self.criteria.iter().map(Criterion::weight).sum()
    }

    /// Count of individual patterns across all criteria.
    pub fn total_patterns(&self) -> usize {
        self.criteria.iter().map(|c| c.patterns.len()).sum()
    }
}

/// Load and compile a criteria file from disk.
pub fn load_criteria_file(path: &Path) -> anyhow::Result<CriteriaSet> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading criteria file {}", path.display()))?;
    CriteriaSet::from_json_str(&raw)
        .with_context(|| format!("compiling criteria file {}", path.display()))
}

/* ----------------------------
Built-in sets
---------------------------- */

static FLOWCHART: Lazy<CriteriaSet> = Lazy::new(|| {
    CriteriaSet::from_json_str(include_str!("../../config/criteria/flowchart.json"))
        .expect("embedded flowchart criteria")
});

static ALGORITHM: Lazy<CriteriaSet> = Lazy::new(|| {
    CriteriaSet::from_json_str(include_str!("../../config/criteria/algorithm.json"))
        .expect("embedded algorithm criteria")
});

/// Seven structural criteria for flowchart review responses (S1–S7, weights
/// sum to 100).
pub fn flowchart_structure() -> CriteriaSet {
    FLOWCHART.clone()
}

/// Five algorithm-review criteria (weights sum to 100, usually paired with
/// strict bands).
pub fn algorithm_review() -> CriteriaSet {
    ALGORITHM.clone()
}

/* ----------------------------
Hot reload
---------------------------- */

/// Mtime-checked reload wrapper. Starts from the built-in flowchart set and
/// swaps in the file contents whenever the file's modified time changes.
#[derive(Debug)]
pub struct HotReloadCriteria {
    path: PathBuf,
    inner: RwLock<State>,
}

#[derive(Debug)]
struct State {
    set: CriteriaSet,
    last_modified: Option<SystemTime>,
}

impl HotReloadCriteria {
    /// Create with a path (defaults to "config/criteria/flowchart.json" if `None`).
    pub fn new(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("config/criteria/flowchart.json"));
        Self {
            path,
            inner: RwLock::new(State {
                set: flowchart_structure(),
                last_modified: None,
            }),
        }
    }

    /// Get the latest set, reloading if the file changed. A missing or
    /// invalid file keeps the previous set.
    pub fn current(&self) -> CriteriaSet {
        let needs_reload = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(mtime) => {
                let guard = self.inner.read().unwrap();
                guard.last_modified != Some(mtime)
            }
            Err(_) => false,
        };

        if !needs_reload {
            return self.inner.read().unwrap().set.clone();
        }

        let mut guard = self.inner.write().unwrap();
        if let Ok(meta) = fs::metadata(&self.path) {
            if let Ok(mtime) = meta.modified() {
                if guard.last_modified != Some(mtime) {
                    if let Ok(set) = load_criteria_file(&self.path) {
                        guard.set = set;
                        guard.last_modified = Some(mtime);
                    }
                }
            }
        }
        guard.set.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sets_compile_and_sum_to_100() {
        let f = flowchart_structure();
        assert_eq!(f.len(), 7);
        assert_eq!(f.total_weight(), 100);
        assert_eq!(f.total_patterns(), 21);

        let a = algorithm_review();
        assert_eq!(a.len(), 5);
        assert_eq!(a.total_weight(), 100);
        assert_eq!(a.total_patterns(), 5);
    }

    #[test]
    fn patterns_match_case_insensitively() {
        let c = Criterion::new("demo", &["start|end"], 10, "yes", "no").unwrap();
        assert!(c.patterns()[0].is_match("the START node"));
        assert!(!c.patterns()[0].is_match("middle"));
    }

    #[test]
    fn zero_weight_is_rejected() {
        let err = Criterion::new("w0", &["x"], 0, "p", "n").unwrap_err();
        assert!(err.to_string().contains("positive weight"), "{err}");
    }

    #[test]
    fn bad_pattern_names_the_criterion() {
        let err = Criterion::new("broken", &["("], 5, "p", "n").unwrap_err();
        assert!(err.to_string().contains("broken"), "{err}");
    }

    #[test]
    fn missing_feedback_falls_back_to_defaults() {
        let set = CriteriaSet::from_json_str(
            r#"{"criteria":[{"name":"bare","patterns":["x"],"weight":5}]}"#,
        )
        .unwrap();
        assert_eq!(set.criteria()[0].feedback_for(true), DEFAULT_POSITIVE);
        assert_eq!(set.criteria()[0].feedback_for(false), DEFAULT_NEGATIVE);
    }
}
