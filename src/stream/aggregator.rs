//! Chunk-tolerant reassembly of a newline-delimited model response.
//!
//! The transport hands over raw text chunks with no boundary alignment: one
//! chunk may hold zero, one, or several records, and may end mid-record. The
//! aggregator buffers the unterminated tail, drains complete lines through
//! the decode pipeline, and keeps content fragments in arrival order. One
//! aggregator instance per analysis run, single writer.

use crate::stream::record::{decode_fragment, DecodeOutcome, StreamRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// Read-only snapshot returned by [`ResponseAggregator::finalize`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSummary {
    /// Content fragments concatenated in arrival order, no separator.
    pub text: String,
    pub chunk_count: u64,
    pub byte_count: u64,
    pub elapsed_seconds: f64,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// First model-reported error record, surfaced alongside any partial text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_error: Option<String>,
}

/// Per-run aggregation state. Created at the start of an analysis request,
/// mutated only by [`ingest`](Self::ingest), frozen by
/// [`finalize`](Self::finalize).
#[derive(Debug)]
pub struct ResponseAggregator {
    buffer: String,
    assembled: Vec<String>,
    chunk_count: u64,
    byte_count: u64,
    started: Instant,
    started_at: DateTime<Utc>,
    metadata: Map<String, Value>,
    model_error: Option<String>,
    snapshot: Option<StreamSummary>,
}

impl ResponseAggregator {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            assembled: Vec::new(),
            chunk_count: 0,
            byte_count: 0,
            started: Instant::now(),
            started_at: Utc::now(),
            metadata: Map::new(),
            model_error: None,
            snapshot: None,
        }
    }

    /// Feed one transport chunk. Complete newline-terminated records are
    /// drained immediately; an unterminated tail stays buffered unless it
    /// already parses as one full record (a final chunk with no delimiter).
    pub fn ingest(&mut self, chunk: &str) {
        if self.snapshot.is_some() {
            debug!(target: "stream", "chunk after finalize ignored");
            return;
        }
        self.chunk_count += 1;
        self.byte_count += chunk.len() as u64;
        self.buffer.push_str(chunk);

        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            let outcome = decode_fragment(&line);
            self.apply_outcome(outcome);
        }

        self.try_consume_trailing_record();
    }

    /// Growing answer so far (used for live display while the run is open).
    pub fn partial_text(&self) -> String {
        self.assembled.concat()
    }

    /// First error record the model reported, if any.
    pub fn model_error(&self) -> Option<&str> {
        self.model_error.as_deref()
    }

    pub fn chunk_count(&self) -> u64 {
        self.chunk_count
    }

    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    /// Freeze the run and return the snapshot. Idempotent: a second call
    /// returns the same snapshot without reprocessing. An undecodable tail
    /// is dropped and is not an error.
    pub fn finalize(&mut self) -> StreamSummary {
        if let Some(snap) = &self.snapshot {
            return snap.clone();
        }
        if !self.buffer.trim().is_empty() {
            debug!(target: "stream", len = self.buffer.len(), "dropping undecodable tail");
        }
        let summary = StreamSummary {
            text: self.assembled.concat(),
            chunk_count: self.chunk_count,
            byte_count: self.byte_count,
            elapsed_seconds: self.started.elapsed().as_secs_f64(),
            started_at: self.started_at,
            metadata: self.metadata.clone(),
            model_error: self.model_error.clone(),
        };
        debug!(
            target: "stream",
            chunks = summary.chunk_count,
            bytes = summary.byte_count,
            fragments = self.assembled.len(),
            "stream finalized"
        );
        self.snapshot = Some(summary.clone());
        summary
    }

    fn apply_outcome(&mut self, outcome: DecodeOutcome) {
        match outcome {
            DecodeOutcome::Decoded(rec) => self.apply_record(rec),
            DecodeOutcome::Recovered(text) => {
                warn!(target: "stream", len = text.len(), "recovered content from malformed record");
                self.assembled.push(text);
            }
            DecodeOutcome::Dropped => {
                debug!(target: "stream", "dropped undecodable fragment");
            }
        }
    }

    fn apply_record(&mut self, rec: StreamRecord) {
        if let Some(err) = rec.error {
            // First error wins; later records in the same chunk still drain.
            if self.model_error.is_none() {
                warn!(target: "stream", error = %err, "model reported an error record");
                self.model_error = Some(err);
            }
        }
        if let Some(content) = rec.message.and_then(|m| m.content) {
            self.assembled.push(content);
        }
        if let Some(meta) = rec.metadata {
            // Additive merge, later keys overwrite.
            for (k, v) in meta {
                self.metadata.insert(k, v);
            }
        }
    }

    fn try_consume_trailing_record(&mut self) {
        let trimmed = self.buffer.trim();
        if trimmed.is_empty() {
            return;
        }
        if let Ok(rec) = serde_json::from_str::<StreamRecord>(trimmed) {
            self.buffer.clear();
            self.apply_record(rec);
        }
    }
}

impl Default for ResponseAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Batched convenience: replay `chunks` through a fresh aggregator.
pub fn aggregate_all<I, S>(chunks: I) -> StreamSummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut agg = ResponseAggregator::new();
    for chunk in chunks {
        agg.ingest(chunk.as_ref());
    }
    agg.finalize()
}
