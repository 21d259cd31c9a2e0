//! Reassembly must not depend on how the transport slices the stream.

use flowchart_grader::stream::{aggregate_all, ResponseAggregator};

const STREAM: &str = concat!(
    r#"{"message":{"content":"The flowchart "}}"#,
    "\n",
    r#"{"metadata":{"model":"llava"}}"#,
    "\n",
    r#"{"message":{"content":"starts at node 1."}}"#,
    "\n",
);
const EXPECTED: &str = "The flowchart starts at node 1.";

#[test]
fn one_chunk() {
    let summary = aggregate_all([STREAM]);
    assert_eq!(summary.text, EXPECTED);
    assert_eq!(summary.metadata["model"], "llava");
}

#[test]
fn every_two_way_split_yields_identical_text() {
    for i in 0..=STREAM.len() {
        let summary = aggregate_all([&STREAM[..i], &STREAM[i..]]);
        assert_eq!(summary.text, EXPECTED, "split at byte {i}");
    }
}

#[test]
fn twenty_chunk_split_of_single_record() {
    let record = r#"{"message":{"content":"AB"}}"#.to_string() + "\n";
    let mut chunks: Vec<String> = record[..19].chars().map(|c| c.to_string()).collect();
    chunks.push(record[19..].to_string());
    assert_eq!(chunks.len(), 20);
    assert_eq!(aggregate_all(&chunks).text, "AB");
}

#[test]
fn byte_at_a_time_split() {
    let mut agg = ResponseAggregator::new();
    for i in 0..STREAM.len() {
        agg.ingest(&STREAM[i..=i]);
    }
    let summary = agg.finalize();
    assert_eq!(summary.text, EXPECTED);
    assert_eq!(summary.chunk_count, STREAM.len() as u64);
    assert_eq!(summary.byte_count, STREAM.len() as u64);
}

#[test]
fn split_inside_the_escape_sequence() {
    let record = r#"{"message":{"content":"a\nb"}}"#;
    // Break between the backslash and the 'n'.
    let cut = record.find(r"\n").unwrap() + 1;
    let summary = aggregate_all([&record[..cut], &record[cut..], "\n"]);
    assert_eq!(summary.text, "a\nb");
}
