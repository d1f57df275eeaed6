//! Merge command implementation.

use chrono::Utc;
use lexisync_merge::{merge_project, Conflict, Entry, MergeStats, ProjectMerge};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Merge output.
#[derive(Debug, Serialize)]
pub struct MergeReport {
    /// Merge counters.
    pub stats: MergeStats,
    /// Fields changed on both sides.
    pub conflicts: Vec<ConflictSummary>,
    /// The merged entry set.
    pub entries: Vec<Entry>,
}

/// One conflicting field.
#[derive(Debug, Serialize)]
pub struct ConflictSummary {
    /// Field path.
    pub path: String,
    /// Side whose value was kept.
    pub winner: String,
}

impl From<&Conflict> for ConflictSummary {
    fn from(conflict: &Conflict) -> Self {
        Self {
            path: conflict.path.clone(),
            winner: conflict.winner.to_string(),
        }
    }
}

impl From<ProjectMerge> for MergeReport {
    fn from(merge: ProjectMerge) -> Self {
        Self {
            stats: merge.stats,
            conflicts: merge
                .outcomes
                .iter()
                .flat_map(|outcome| outcome.conflicts.iter().map(ConflictSummary::from))
                .collect(),
            entries: merge.snapshot(),
        }
    }
}

/// Runs the merge command.
pub fn run(
    previous: &Path,
    store: &Path,
    model: &Path,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let previous = read_entries(previous)?;
    let store = read_entries(store)?;
    let model = read_entries(model)?;

    let merge = merge_project(&previous, &store, &model, Utc::now())?;
    let report = MergeReport::from(merge);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn read_entries(path: &Path) -> Result<Vec<Entry>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No entry file found at {:?}", path).into());
    }
    let data = fs::read(path)?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(&data)?)
}

fn print_report(report: &MergeReport) {
    let stats = &report.stats;
    println!("Merge Statistics");
    println!("================");
    println!("Entries:            {}", stats.entries);
    println!("Unchanged:          {}", stats.unchanged);
    println!();
    println!("                    store   model");
    println!(
        "Created:            {:>5}   {:>5}",
        stats.created_in_store, stats.created_in_model
    );
    println!(
        "Updated:            {:>5}   {:>5}",
        stats.updated_in_store, stats.updated_in_model
    );
    println!(
        "Deleted:            {:>5}   {:>5}",
        stats.deleted_in_store, stats.deleted_in_model
    );

    if !report.conflicts.is_empty() {
        println!();
        println!("Conflicts ({}):", report.conflicts.len());
        for conflict in &report.conflicts {
            println!("  {} (kept {})", conflict.path, conflict.winner);
        }
    }
}
