//! Replays a captured NDJSON transcript through the aggregator and grades
//! the assembled answer with the flowchart criteria set.
//!
//! Usage: `grade-demo <transcript.ndjson>`

use anyhow::Context;
use flowchart_grader::config::EngineConfig;
use flowchart_grader::grade::{flowchart_structure, grade};
use flowchart_grader::stream::ResponseAggregator;
use tracing::warn;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let path = std::env::args()
        .nth(1)
        .context("usage: grade-demo <transcript.ndjson>")?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading transcript {path}"))?;

    // Two ingests per record to exercise the split-tolerant path.
    let mut agg = ResponseAggregator::new();
    for line in raw.lines() {
        agg.ingest(line);
        agg.ingest("\n");
    }
    let summary = agg.finalize();

    if let Some(err) = &summary.model_error {
        warn!(error = %err, "model reported an error; grading partial text");
    }
    println!(
        "assembled {} bytes from {} chunks in {:.3}s",
        summary.text.len(),
        summary.chunk_count,
        summary.elapsed_seconds
    );

    let cfg = EngineConfig::load()?;
    let set = flowchart_structure();
    let report = grade(&summary.text, &set, &cfg.options_for(&set));

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
