//! Decode command implementation.

use lexisync_spantext::{decode, span_count, Run};
use serde::Serialize;

/// Decoded span text.
#[derive(Debug, Serialize)]
pub struct DecodeResult {
    /// Number of runs.
    pub run_count: usize,
    /// Number of well-formed span regions.
    pub span_count: usize,
    /// The runs, in order.
    pub runs: Vec<Run>,
}

impl DecodeResult {
    /// Decodes `text`.
    pub fn new(text: &str) -> Self {
        let runs = decode(text);
        Self {
            run_count: runs.len(),
            span_count: span_count(text),
            runs,
        }
    }
}

/// Runs the decode command.
pub fn run(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = DecodeResult::new(text);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
