// src/stream/mod.rs
//! Stream reassembly: raw transport chunks → one ordered answer string.

pub mod aggregator;
pub mod record;

pub use aggregator::{aggregate_all, ResponseAggregator, StreamSummary};
pub use record::{decode_fragment, DecodeOutcome, RecordMessage, StreamRecord};
