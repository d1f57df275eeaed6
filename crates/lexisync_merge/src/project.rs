//! Whole-project merge.

use crate::entry::Entry;
use crate::error::{MergeError, MergeResult};
use crate::policy::{merge_entry, EntryOutcome, WriteAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Counters describing one project merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    /// Entries considered.
    pub entries: usize,
    /// Entries with no state change.
    pub unchanged: usize,
    /// Entries created in the document store.
    pub created_in_store: usize,
    /// Entries created in the desktop model.
    pub created_in_model: usize,
    /// Entries updated in the document store.
    pub updated_in_store: usize,
    /// Entries updated in the desktop model.
    pub updated_in_model: usize,
    /// Entries flagged deleted in the document store.
    pub deleted_in_store: usize,
    /// Entries removed from the desktop model.
    pub deleted_in_model: usize,
    /// Fields changed on both sides.
    pub conflicts: usize,
}

/// Result of merging every entry of a project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectMerge {
    /// Per-entry outcomes, in store order followed by model-only entries.
    pub outcomes: Vec<EntryOutcome>,
    /// Summary counters.
    pub stats: MergeStats,
}

impl ProjectMerge {
    /// The merged entry set, to be kept as `previous` for the next sync.
    pub fn snapshot(&self) -> Vec<Entry> {
        self.outcomes
            .iter()
            .map(|outcome| outcome.merged.clone())
            .collect()
    }

    /// Outcomes that require a document-store write.
    pub fn store_writes(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.store_action.is_write())
    }

    /// Outcomes that require a desktop-model write.
    pub fn model_writes(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.model_action.is_write())
    }
}

/// Merge every entry of a project.
///
/// Entries are matched by GUID across the three inputs. Entries that exist
/// only in `previous` have been removed from both sides and produce no
/// outcome.
///
/// # Errors
///
/// Returns [`MergeError::MissingGuid`] or [`MergeError::DuplicateGuid`] if
/// one input has a nil or repeated entry GUID, and any error from
/// [`merge_entry`].
pub fn merge_project(
    previous: &[Entry],
    store: &[Entry],
    model: &[Entry],
    started_at: DateTime<Utc>,
) -> MergeResult<ProjectMerge> {
    let prev_by_guid = index(previous, "previous")?;
    let store_by_guid = index(store, "store")?;
    let model_by_guid = index(model, "model")?;

    let order = store
        .iter()
        .map(|entry| entry.guid)
        .chain(
            model
                .iter()
                .map(|entry| entry.guid)
                .filter(|guid| !store_by_guid.contains_key(guid)),
        );

    let mut result = ProjectMerge::default();
    for guid in order {
        let outcome = merge_entry(
            prev_by_guid.get(&guid).copied(),
            store_by_guid.get(&guid).copied(),
            model_by_guid.get(&guid).copied(),
            started_at,
        )?;
        if let Some(outcome) = outcome {
            result.stats.record(&outcome);
            result.outcomes.push(outcome);
        }
    }
    Ok(result)
}

impl MergeStats {
    fn record(&mut self, outcome: &EntryOutcome) {
        self.entries += 1;
        self.conflicts += outcome.conflicts.len();
        if !outcome.changed {
            self.unchanged += 1;
        }
        match outcome.store_action {
            WriteAction::Create => self.created_in_store += 1,
            WriteAction::Update if outcome.merged.is_deleted => self.deleted_in_store += 1,
            WriteAction::Update => self.updated_in_store += 1,
            WriteAction::Delete => self.deleted_in_store += 1,
            WriteAction::None => {}
        }
        match outcome.model_action {
            WriteAction::Create => self.created_in_model += 1,
            WriteAction::Update => self.updated_in_model += 1,
            WriteAction::Delete => self.deleted_in_model += 1,
            WriteAction::None => {}
        }
    }
}

fn index<'a>(entries: &'a [Entry], path: &str) -> MergeResult<HashMap<Uuid, &'a Entry>> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut by_guid = HashMap::with_capacity(entries.len());
    for entry in entries {
        if entry.guid.is_nil() {
            return Err(MergeError::missing_guid(path));
        }
        if !seen.insert(entry.guid) {
            return Err(MergeError::duplicate_guid(path, entry.guid));
        }
        by_guid.insert(entry.guid, entry);
    }
    Ok(by_guid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Sense;
    use crate::field::FieldValue;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn entry(guid: Uuid, lexeme: &str) -> Entry {
        Entry::new(guid, at(100)).with_field("lexeme", FieldValue::multi("qaa", lexeme))
    }

    #[test]
    fn first_sync_creates_on_both_sides() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let merge = merge_project(&[], &[entry(a, "a")], &[entry(b, "b")], at(200)).unwrap();

        assert_eq!(merge.outcomes.len(), 2);
        assert_eq!(merge.stats.created_in_model, 1);
        assert_eq!(merge.stats.created_in_store, 1);
        assert_eq!(merge.snapshot().len(), 2);
        assert_eq!(merge.store_writes().count(), 2);
        assert_eq!(merge.model_writes().count(), 2);
    }

    #[test]
    fn unchanged_project_is_a_no_op() {
        let entries = vec![entry(Uuid::new_v4(), "a"), entry(Uuid::new_v4(), "b")];
        let merge = merge_project(&entries, &entries, &entries, at(500)).unwrap();
        assert_eq!(merge.stats.unchanged, 2);
        assert_eq!(merge.store_writes().count(), 0);
        assert_eq!(merge.model_writes().count(), 0);
        assert_eq!(merge.snapshot(), entries);
    }

    #[test]
    fn entries_gone_from_both_sides_are_dropped() {
        let gone = entry(Uuid::new_v4(), "gone");
        let merge = merge_project(&[gone], &[], &[], at(1)).unwrap();
        assert!(merge.outcomes.is_empty());
        assert_eq!(merge.stats, MergeStats::default());
    }

    #[test]
    fn stats_count_deletions_and_conflicts() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let sense = Uuid::new_v4();
        let with_gloss = |guid, text: &str| {
            entry(guid, "x").with_sense(Sense::new(sense).with_field("gloss", FieldValue::multi("en", text)))
        };
        let previous = vec![entry(a, "a"), with_gloss(b, "X")];
        let store = vec![entry(a, "a"), with_gloss(b, "LF")];
        let model = vec![with_gloss(b, "FW")];

        let merge = merge_project(&previous, &store, &model, at(300)).unwrap();
        assert_eq!(merge.stats.deleted_in_store, 1);
        assert_eq!(merge.stats.conflicts, 1);
        assert_eq!(merge.stats.updated_in_model, 1);
    }

    #[test]
    fn duplicate_entry_guid_is_an_error() {
        let a = entry(Uuid::new_v4(), "a");
        assert_eq!(
            merge_project(&[], &[a.clone(), a.clone()], &[], at(1)),
            Err(MergeError::duplicate_guid("store", a.guid))
        );
        assert_eq!(
            merge_project(&[], &[], &[entry(Uuid::nil(), "n")], at(1)),
            Err(MergeError::missing_guid("model"))
        );
    }
}
