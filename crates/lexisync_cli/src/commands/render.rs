//! Render command implementation.

use lexisync_spantext::{encode, from_native, Run, WritingSystemRegistry};
use std::fs;
use std::path::Path;

/// Runs the render command.
pub fn run(
    runs_path: &Path,
    default_ws: &str,
    extra_ws: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(runs_path)?;
    let runs: Vec<Run> = serde_json::from_slice(&data)?;
    println!("{}", render(&runs, default_ws, extra_ws)?);
    Ok(())
}

/// Renders `runs` as span text through native rich text.
pub fn render(
    runs: &[Run],
    default_ws: &str,
    extra_ws: &[String],
) -> Result<String, Box<dyn std::error::Error>> {
    let mut registry = WritingSystemRegistry::new();
    let default_id = registry.register(default_ws);
    for tag in extra_ws {
        registry.register(tag.as_str());
    }

    let native = encode(runs, default_id, &registry)?;
    Ok(from_native(&native, default_id, &registry)?)
}
