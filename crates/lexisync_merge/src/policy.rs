//! Three-way merge of entries, child collections and fields.
//!
//! Every merge takes the state as of the last completed sync (`previous`,
//! absent for new elements), the current document-store state and the
//! current desktop-model state. A side "changed" an element when its state
//! differs from `previous`; without `previous`, any present value counts as
//! a change. When both sides changed the same field the store value wins.

use crate::conflict::{Conflict, Decision, DecisionKind, MergeLog, Side};
use crate::entry::{Entry, Example, Picture, Sense};
use crate::error::{MergeError, MergeResult};
use crate::field::{same_value, Fields};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use uuid::Uuid;

/// What must be written to one store after a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    /// Nothing to write.
    None,
    /// The entry does not exist on this side yet.
    Create,
    /// The entry exists and gets the merged state.
    Update,
    /// The entry is removed from this side.
    Delete,
}

impl WriteAction {
    /// Returns true if anything must be written.
    pub fn is_write(&self) -> bool {
        !matches!(self, WriteAction::None)
    }
}

/// The result of merging one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryOutcome {
    /// The merged entry; this becomes `previous` for the next sync.
    pub merged: Entry,
    /// True if the merge produced any state change.
    pub changed: bool,
    /// Write needed in the document store.
    pub store_action: WriteAction,
    /// Write needed in the desktop model.
    pub model_action: WriteAction,
    /// Every decision made, in evaluation order.
    pub decisions: Vec<Decision>,
    /// Fields that both sides changed.
    pub conflicts: Vec<Conflict>,
}

impl EntryOutcome {
    fn new(merged: Entry, log: MergeLog) -> Self {
        Self {
            merged,
            changed: false,
            store_action: WriteAction::None,
            model_action: WriteAction::None,
            decisions: log.decisions,
            conflicts: log.conflicts,
        }
    }

    fn unchanged(merged: Entry) -> Self {
        Self::new(merged, MergeLog::default())
    }

    fn with_actions(mut self, store: WriteAction, model: WriteAction) -> Self {
        self.changed = true;
        self.store_action = store;
        self.model_action = model;
        self
    }
}

/// Returns the timestamp a changed entry gets.
///
/// The result is strictly later than every input's modification times and
/// no earlier than `started_at`.
pub fn bumped_timestamp(
    started_at: DateTime<Utc>,
    inputs: &[Option<&Entry>],
) -> DateTime<Utc> {
    inputs
        .iter()
        .flatten()
        .map(|entry| entry.last_modified() + Duration::milliseconds(1))
        .fold(started_at, |latest, stamp| latest.max(stamp))
}

/// Merge one entry.
///
/// Returns `Ok(None)` when the entry exists on neither side. A model-side
/// entry flagged as deleted is treated as absent.
///
/// # Errors
///
/// Returns [`MergeError::GuidMismatch`] if the inputs are not the same
/// entry, [`MergeError::MissingGuid`] for a nil identity and
/// [`MergeError::DuplicateGuid`] if a child collection repeats a GUID.
pub fn merge_entry(
    previous: Option<&Entry>,
    store: Option<&Entry>,
    model: Option<&Entry>,
    started_at: DateTime<Utc>,
) -> MergeResult<Option<EntryOutcome>> {
    let model = model.filter(|entry| !entry.is_deleted);
    let guid = check_identity(&[previous, store, model])?;
    let path = guid.to_string();
    let stamp = bumped_timestamp(started_at, &[previous, store, model]);

    let outcome = match (store, model) {
        (None, None) => return Ok(None),

        (Some(store), None) => {
            if store.is_deleted {
                EntryOutcome::unchanged(store.clone())
            } else {
                let mut log = MergeLog::default();
                match previous {
                    Some(prev) if !store_changed(prev, store) => {
                        log.decide(&path, Side::Model, DecisionKind::Deleted);
                        let mut merged = stamped(store.clone(), stamp);
                        merged.is_deleted = true;
                        EntryOutcome::new(merged, log)
                            .with_actions(WriteAction::Update, WriteAction::None)
                    }
                    Some(_) => {
                        log.decide(&path, Side::Store, DecisionKind::Restored);
                        EntryOutcome::new(stamped(store.clone(), stamp), log)
                            .with_actions(WriteAction::Update, WriteAction::Create)
                    }
                    None => {
                        log.decide(&path, Side::Store, DecisionKind::Created);
                        EntryOutcome::new(stamped(store.clone(), stamp), log)
                            .with_actions(WriteAction::Update, WriteAction::Create)
                    }
                }
            }
        }

        (None, Some(model)) => {
            let mut log = MergeLog::default();
            match previous {
                Some(prev) if prev.content_same(model) => {
                    log.decide(&path, Side::Store, DecisionKind::Deleted);
                    let mut merged = stamped(model.clone(), stamp);
                    merged.is_deleted = true;
                    EntryOutcome::new(merged, log)
                        .with_actions(WriteAction::None, WriteAction::Delete)
                }
                _ => {
                    let kind = if previous.is_some() {
                        DecisionKind::Restored
                    } else {
                        DecisionKind::Created
                    };
                    log.decide(&path, Side::Model, kind);
                    EntryOutcome::new(stamped(model.clone(), stamp), log)
                        .with_actions(WriteAction::Create, WriteAction::Update)
                }
            }
        }

        (Some(store), Some(model)) if store.is_deleted => {
            let model_edited = match previous {
                Some(prev) => !prev.content_same(model),
                None => model.source_modified > store.date_modified,
            };
            let mut log = MergeLog::default();
            if model_edited {
                log.decide(&path, Side::Model, DecisionKind::Undeleted);
                let mut merged = stamped(model.clone(), stamp);
                merged.is_deleted = false;
                EntryOutcome::new(merged, log)
                    .with_actions(WriteAction::Update, WriteAction::Update)
            } else {
                log.decide(&path, Side::Store, DecisionKind::Deleted);
                EntryOutcome::new(stamped(store.clone(), stamp), log)
                    .with_actions(WriteAction::Update, WriteAction::Delete)
            }
        }

        (Some(store), Some(model)) => {
            let mut log = MergeLog::default();
            let merged = Entry {
                guid,
                is_deleted: false,
                date_modified: store.date_modified,
                source_modified: model.source_modified,
                fields: merge_fields(
                    previous.map(|prev| &prev.fields),
                    &store.fields,
                    &model.fields,
                    &path,
                    &mut log,
                ),
                senses: merge_collection(
                    previous.map(|prev| prev.senses.as_slice()),
                    &store.senses,
                    &model.senses,
                    &format!("{path}/senses"),
                    &mut log,
                )?,
            };

            let changed = !log.conflicts.is_empty()
                || !merged.content_same(store)
                || !merged.content_same(model);
            if changed {
                EntryOutcome::new(stamped(merged, stamp), log)
                    .with_actions(WriteAction::Update, WriteAction::Update)
            } else {
                EntryOutcome::new(merged, log)
            }
        }
    };

    Ok(Some(outcome))
}

fn stamped(mut entry: Entry, stamp: DateTime<Utc>) -> Entry {
    entry.date_modified = stamp;
    entry.source_modified = stamp;
    entry
}

fn store_changed(previous: &Entry, store: &Entry) -> bool {
    previous.is_deleted != store.is_deleted || !previous.content_same(store)
}

fn check_identity(inputs: &[Option<&Entry>]) -> MergeResult<Uuid> {
    let mut present = inputs.iter().flatten();
    let Some(first) = present.next() else {
        return Ok(Uuid::nil());
    };
    if first.guid.is_nil() {
        return Err(MergeError::missing_guid("entry"));
    }
    for other in present {
        if other.guid != first.guid {
            return Err(MergeError::GuidMismatch {
                expected: first.guid,
                found: other.guid,
            });
        }
    }
    Ok(first.guid)
}

/// Three-way merge of a field set.
///
/// Fields are merged independently. A field changed on one side only takes
/// that side's value, including removal. A field changed on both sides to
/// different values keeps the store value and records a [`Conflict`].
pub(crate) fn merge_fields(
    previous: Option<&Fields>,
    store: &Fields,
    model: &Fields,
    path: &str,
    log: &mut MergeLog,
) -> Fields {
    let names: BTreeSet<&String> = store
        .keys()
        .chain(model.keys())
        .chain(previous.into_iter().flat_map(|prev| prev.keys()))
        .collect();

    let mut merged = Fields::new();
    for name in names {
        let prev = previous.and_then(|prev| prev.get(name));
        let store_value = store.get(name);
        let model_value = model.get(name);

        let value = if same_value(store_value, model_value) {
            store_value
        } else {
            let (store_changed, model_changed) = match previous {
                Some(_) => (
                    !same_value(prev, store_value),
                    !same_value(prev, model_value),
                ),
                None => (store_value.is_some(), model_value.is_some()),
            };
            let field_path = format!("{path}.{name}");
            match (store_changed, model_changed) {
                (false, true) => {
                    log.decide(field_path, Side::Model, DecisionKind::FieldChanged);
                    model_value
                }
                (true, true) => {
                    log.conflict(Conflict {
                        path: field_path,
                        previous: prev.cloned(),
                        store: store_value.cloned(),
                        model: model_value.cloned(),
                        winner: Side::Store,
                    });
                    store_value
                }
                _ => {
                    log.decide(field_path, Side::Store, DecisionKind::FieldChanged);
                    store_value
                }
            }
        };

        if let Some(value) = value {
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}

/// A GUID-identified child that can be merged as part of a collection.
pub(crate) trait Node: Clone {
    fn guid(&self) -> Uuid;

    fn same_as(&self, other: &Self) -> bool;

    fn merge(
        previous: Option<&Self>,
        store: &Self,
        model: &Self,
        path: &str,
        log: &mut MergeLog,
    ) -> MergeResult<Self>;
}

impl Node for Sense {
    fn guid(&self) -> Uuid {
        self.guid
    }

    fn same_as(&self, other: &Self) -> bool {
        Sense::same_as(self, other)
    }

    fn merge(
        previous: Option<&Self>,
        store: &Self,
        model: &Self,
        path: &str,
        log: &mut MergeLog,
    ) -> MergeResult<Self> {
        Ok(Sense {
            guid: store.guid,
            fields: merge_fields(
                previous.map(|prev| &prev.fields),
                &store.fields,
                &model.fields,
                path,
                log,
            ),
            examples: merge_collection(
                previous.map(|prev| prev.examples.as_slice()),
                &store.examples,
                &model.examples,
                &format!("{path}/examples"),
                log,
            )?,
            pictures: merge_collection(
                previous.map(|prev| prev.pictures.as_slice()),
                &store.pictures,
                &model.pictures,
                &format!("{path}/pictures"),
                log,
            )?,
        })
    }
}

impl Node for Example {
    fn guid(&self) -> Uuid {
        self.guid
    }

    fn same_as(&self, other: &Self) -> bool {
        Example::same_as(self, other)
    }

    fn merge(
        previous: Option<&Self>,
        store: &Self,
        model: &Self,
        path: &str,
        log: &mut MergeLog,
    ) -> MergeResult<Self> {
        Ok(Example {
            guid: store.guid,
            fields: merge_fields(
                previous.map(|prev| &prev.fields),
                &store.fields,
                &model.fields,
                path,
                log,
            ),
        })
    }
}

impl Node for Picture {
    fn guid(&self) -> Uuid {
        self.guid
    }

    fn same_as(&self, other: &Self) -> bool {
        Picture::same_as(self, other)
    }

    fn merge(
        previous: Option<&Self>,
        store: &Self,
        model: &Self,
        path: &str,
        log: &mut MergeLog,
    ) -> MergeResult<Self> {
        Ok(Picture {
            guid: store.guid,
            fields: merge_fields(
                previous.map(|prev| &prev.fields),
                &store.fields,
                &model.fields,
                path,
                log,
            ),
        })
    }
}

/// Merge a GUID-keyed child collection.
///
/// The result lists store elements in store order, followed by
/// model-only elements in model order. An element missing on one side is
/// dropped if the other side left it unchanged since `previous` and kept
/// otherwise; an element with no `previous` record is a creation.
pub(crate) fn merge_collection<N: Node>(
    previous: Option<&[N]>,
    store: &[N],
    model: &[N],
    path: &str,
    log: &mut MergeLog,
) -> MergeResult<Vec<N>> {
    let previous = previous.unwrap_or_default();
    let prev_by_guid = index(previous, path)?;
    let store_by_guid = index(store, path)?;
    let model_by_guid = index(model, path)?;

    let mut merged = Vec::with_capacity(store.len().max(model.len()));

    for item in store {
        let guid = item.guid();
        let item_path = format!("{path}/{guid}");
        let prev = prev_by_guid.get(&guid).copied();

        match model_by_guid.get(&guid) {
            Some(other) => merged.push(N::merge(prev, item, other, &item_path, log)?),
            None => match prev {
                Some(prev) if prev.same_as(item) => {
                    log.decide(item_path, Side::Model, DecisionKind::Deleted);
                }
                Some(_) => {
                    log.decide(item_path, Side::Store, DecisionKind::Restored);
                    merged.push(item.clone());
                }
                None => {
                    log.decide(item_path, Side::Store, DecisionKind::Created);
                    merged.push(item.clone());
                }
            },
        }
    }

    for item in model {
        let guid = item.guid();
        if store_by_guid.contains_key(&guid) {
            continue;
        }
        let item_path = format!("{path}/{guid}");
        match prev_by_guid.get(&guid) {
            Some(prev) if prev.same_as(item) => {
                log.decide(item_path, Side::Store, DecisionKind::Deleted);
            }
            Some(_) => {
                log.decide(item_path, Side::Model, DecisionKind::Restored);
                merged.push(item.clone());
            }
            None => {
                log.decide(item_path, Side::Model, DecisionKind::Created);
                merged.push(item.clone());
            }
        }
    }

    Ok(merged)
}

fn index<'a, N: Node>(items: &'a [N], path: &str) -> MergeResult<HashMap<Uuid, &'a N>> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut by_guid = HashMap::with_capacity(items.len());
    for item in items {
        let guid = item.guid();
        if guid.is_nil() {
            return Err(MergeError::missing_guid(path));
        }
        if !seen.insert(guid) {
            return Err(MergeError::duplicate_guid(path, guid));
        }
        by_guid.insert(guid, item);
    }
    Ok(by_guid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldValue;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn gloss(text: &str) -> FieldValue {
        FieldValue::multi("en", text)
    }

    fn entry_with_gloss(guid: Uuid, sense: Uuid, text: &str, modified: i64) -> Entry {
        Entry::new(guid, at(modified))
            .with_field("lexeme", FieldValue::multi("qaa", "kuma"))
            .with_sense(Sense::new(sense).with_field("gloss", gloss(text)))
    }

    #[test]
    fn scenario_a_no_op() {
        let (guid, sense) = (Uuid::new_v4(), Uuid::new_v4());
        let entry = entry_with_gloss(guid, sense, "X", 100);

        let outcome = merge_entry(Some(&entry), Some(&entry), Some(&entry), at(500))
            .unwrap()
            .unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.merged.date_modified, entry.date_modified);
        assert_eq!(outcome.store_action, WriteAction::None);
        assert_eq!(outcome.model_action, WriteAction::None);
        assert!(outcome.decisions.is_empty());
    }

    #[test]
    fn scenario_b_store_wins_same_field() {
        let (guid, sense) = (Uuid::new_v4(), Uuid::new_v4());
        let previous = entry_with_gloss(guid, sense, "X", 100);
        let store = entry_with_gloss(guid, sense, "X - changed in LF", 200);
        let model = entry_with_gloss(guid, sense, "X - changed in FW", 300);

        let outcome = merge_entry(Some(&previous), Some(&store), Some(&model), at(150))
            .unwrap()
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(
            outcome.merged.senses[0].fields["gloss"],
            gloss("X - changed in LF")
        );
        assert!(outcome.merged.date_modified > store.date_modified);
        assert!(outcome.merged.date_modified > model.source_modified);
        assert!(outcome.merged.source_modified > model.source_modified);
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].winner, Side::Store);
        assert_eq!(outcome.model_action, WriteAction::Update);
    }

    #[test]
    fn conflict_bumps_even_when_store_value_is_kept() {
        let (guid, sense) = (Uuid::new_v4(), Uuid::new_v4());
        let previous = entry_with_gloss(guid, sense, "X", 100);
        let store = entry_with_gloss(guid, sense, "Y", 200);
        // Model changed a different field on the same sense and the gloss.
        let mut model = entry_with_gloss(guid, sense, "Z", 300);
        model.fields.insert("note".into(), gloss("n"));

        let outcome = merge_entry(Some(&previous), Some(&store), Some(&model), at(0))
            .unwrap()
            .unwrap();
        assert_eq!(outcome.merged.senses[0].fields["gloss"], gloss("Y"));
        assert_eq!(outcome.merged.fields["note"], gloss("n"));
        assert!(outcome.merged.date_modified > at(300));
    }

    #[test]
    fn concurrent_edits_to_different_fields_merge() {
        let guid = Uuid::new_v4();
        let previous = Entry::new(guid, at(100))
            .with_field("lexeme", gloss("a"))
            .with_field("note", gloss("n"));
        let store = Entry::new(guid, at(200))
            .with_field("lexeme", gloss("a2"))
            .with_field("note", gloss("n"));
        let model = Entry::new(guid, at(100))
            .with_field("lexeme", gloss("a"))
            .with_field("note", gloss("n2"));

        let outcome = merge_entry(Some(&previous), Some(&store), Some(&model), at(1000))
            .unwrap()
            .unwrap();
        assert_eq!(outcome.merged.fields["lexeme"], gloss("a2"));
        assert_eq!(outcome.merged.fields["note"], gloss("n2"));
        assert!(outcome.conflicts.is_empty());
        assert!(outcome.changed);
        assert!(outcome.merged.date_modified >= at(1000));
    }

    #[test]
    fn removal_on_one_side_wins_when_other_unchanged() {
        let guid = Uuid::new_v4();
        let previous = Entry::new(guid, at(1)).with_field("note", gloss("n"));
        let store = Entry::new(guid, at(1)).with_field("note", gloss("n"));
        let model = Entry::new(guid, at(2));

        let outcome = merge_entry(Some(&previous), Some(&store), Some(&model), at(3))
            .unwrap()
            .unwrap();
        assert!(!outcome.merged.fields.contains_key("note"));
        assert_eq!(outcome.store_action, WriteAction::Update);
    }

    #[test]
    fn scenario_c_model_delete_wins_over_stale_store() {
        let (guid, sense) = (Uuid::new_v4(), Uuid::new_v4());
        let previous = entry_with_gloss(guid, sense, "X", 100);
        let store = previous.clone();

        let outcome = merge_entry(Some(&previous), Some(&store), None, at(150))
            .unwrap()
            .unwrap();
        assert!(outcome.merged.is_deleted);
        assert!(outcome.merged.date_modified > store.date_modified);
        assert_eq!(outcome.store_action, WriteAction::Update);
        assert_eq!(outcome.model_action, WriteAction::None);
    }

    #[test]
    fn store_edit_beats_model_delete() {
        let (guid, sense) = (Uuid::new_v4(), Uuid::new_v4());
        let previous = entry_with_gloss(guid, sense, "X", 100);
        let store = entry_with_gloss(guid, sense, "X edited", 200);

        let outcome = merge_entry(Some(&previous), Some(&store), None, at(150))
            .unwrap()
            .unwrap();
        assert!(!outcome.merged.is_deleted);
        assert_eq!(outcome.model_action, WriteAction::Create);
        assert_eq!(outcome.decisions[0].kind, DecisionKind::Restored);
    }

    #[test]
    fn scenario_d_live_model_edit_beats_store_delete() {
        let (guid, sense) = (Uuid::new_v4(), Uuid::new_v4());
        let previous = entry_with_gloss(guid, sense, "X", 100);
        let store = entry_with_gloss(guid, sense, "X", 200).deleted();
        let model = entry_with_gloss(guid, sense, "X - live edit", 300);

        let outcome = merge_entry(Some(&previous), Some(&store), Some(&model), at(150))
            .unwrap()
            .unwrap();
        assert!(!outcome.merged.is_deleted);
        assert!(outcome.merged.content_same(&model));
        assert!(outcome.merged.date_modified > at(300));
        assert_eq!(outcome.decisions[0].kind, DecisionKind::Undeleted);
    }

    #[test]
    fn store_delete_wins_over_unchanged_model() {
        let (guid, sense) = (Uuid::new_v4(), Uuid::new_v4());
        let previous = entry_with_gloss(guid, sense, "X", 100);
        let store = previous.clone().deleted();

        let outcome = merge_entry(Some(&previous), Some(&store), Some(&previous), at(150))
            .unwrap()
            .unwrap();
        assert!(outcome.merged.is_deleted);
        assert_eq!(outcome.model_action, WriteAction::Delete);
    }

    #[test]
    fn store_delete_without_previous_uses_timestamps() {
        let (guid, sense) = (Uuid::new_v4(), Uuid::new_v4());
        let store = entry_with_gloss(guid, sense, "X", 200).deleted();
        let newer = entry_with_gloss(guid, sense, "X", 300);
        let older = entry_with_gloss(guid, sense, "X", 100);

        let undeleted = merge_entry(None, Some(&store), Some(&newer), at(0))
            .unwrap()
            .unwrap();
        assert!(!undeleted.merged.is_deleted);

        let deleted = merge_entry(None, Some(&store), Some(&older), at(0))
            .unwrap()
            .unwrap();
        assert!(deleted.merged.is_deleted);
    }

    #[test]
    fn existence_rules() {
        let guid = Uuid::new_v4();
        let entry = Entry::new(guid, at(10)).with_field("lexeme", gloss("a"));

        let to_store = merge_entry(None, None, Some(&entry), at(20)).unwrap().unwrap();
        assert_eq!(to_store.store_action, WriteAction::Create);
        assert_eq!(to_store.decisions[0].kind, DecisionKind::Created);

        let to_model = merge_entry(None, Some(&entry), None, at(20)).unwrap().unwrap();
        assert_eq!(to_model.model_action, WriteAction::Create);
        assert_eq!(to_model.decisions[0].winner, Side::Store);

        let deleted = entry.clone().deleted();
        let ignored = merge_entry(Some(&entry), Some(&deleted), None, at(20))
            .unwrap()
            .unwrap();
        assert!(!ignored.changed);

        assert_eq!(merge_entry(Some(&entry), None, None, at(20)).unwrap(), None);
    }

    #[test]
    fn store_removal_applied_to_unchanged_model() {
        let guid = Uuid::new_v4();
        let entry = Entry::new(guid, at(10)).with_field("lexeme", gloss("a"));

        let outcome = merge_entry(Some(&entry), None, Some(&entry), at(20))
            .unwrap()
            .unwrap();
        assert_eq!(outcome.model_action, WriteAction::Delete);
        assert!(outcome.merged.is_deleted);
    }

    #[test]
    fn identity_is_checked() {
        let a = Entry::new(Uuid::new_v4(), at(1));
        let b = Entry::new(Uuid::new_v4(), at(1));
        assert!(matches!(
            merge_entry(None, Some(&a), Some(&b), at(2)),
            Err(MergeError::GuidMismatch { .. })
        ));

        let nil = Entry::new(Uuid::nil(), at(1));
        assert_eq!(
            merge_entry(None, Some(&nil), None, at(2)),
            Err(MergeError::missing_guid("entry"))
        );
    }

    #[test]
    fn duplicate_child_guid_is_an_error() {
        let (guid, sense) = (Uuid::new_v4(), Uuid::new_v4());
        let store = Entry::new(guid, at(1))
            .with_sense(Sense::new(sense))
            .with_sense(Sense::new(sense));
        let model = Entry::new(guid, at(1));

        assert_eq!(
            merge_entry(None, Some(&store), Some(&model), at(2)),
            Err(MergeError::duplicate_guid(format!("{guid}/senses"), sense))
        );
    }

    #[test]
    fn nil_child_guid_is_an_error() {
        let guid = Uuid::new_v4();
        let store = Entry::new(guid, at(1));
        let model = Entry::new(guid, at(1)).with_sense(Sense::new(Uuid::nil()));

        assert!(matches!(
            merge_entry(None, Some(&store), Some(&model), at(2)),
            Err(MergeError::MissingGuid { .. })
        ));
    }

    #[test]
    fn children_created_on_both_sides_keep_their_guids() {
        let guid = Uuid::new_v4();
        let (s1, s2) = (Uuid::new_v4(), Uuid::new_v4());
        let previous = Entry::new(guid, at(1));
        let store = Entry::new(guid, at(2)).with_sense(Sense::new(s1).with_field("gloss", gloss("lf")));
        let model = Entry::new(guid, at(2)).with_sense(Sense::new(s2).with_field("gloss", gloss("fw")));

        let outcome = merge_entry(Some(&previous), Some(&store), Some(&model), at(3))
            .unwrap()
            .unwrap();
        let guids: Vec<Uuid> = outcome.merged.senses.iter().map(|s| s.guid).collect();
        assert_eq!(guids, vec![s1, s2]);
    }

    #[test]
    fn model_edit_restores_child_removed_in_store() {
        let (guid, sense, example) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let with_example = |text: &str| {
            Entry::new(guid, at(1)).with_sense(
                Sense::new(sense)
                    .with_example(Example::new(example).with_field("sentence", gloss(text))),
            )
        };
        let previous = with_example("old");
        let store = Entry::new(guid, at(2)).with_sense(Sense::new(sense));
        let model = with_example("new");

        let outcome = merge_entry(Some(&previous), Some(&store), Some(&model), at(3))
            .unwrap()
            .unwrap();
        let examples = &outcome.merged.senses[0].examples;
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].fields["sentence"], gloss("new"));
        assert!(outcome
            .decisions
            .iter()
            .any(|d| d.kind == DecisionKind::Restored && d.winner == Side::Model));
    }

    #[test]
    fn bumped_timestamp_is_strictly_later() {
        let guid = Uuid::new_v4();
        let mut a = Entry::new(guid, at(10));
        a.source_modified = at(50);
        let b = Entry::new(guid, at(20));
        let stamp = bumped_timestamp(at(5), &[Some(&a), Some(&b), None]);
        assert!(stamp > at(50));
        assert_eq!(bumped_timestamp(at(100), &[Some(&a)]), at(100));
    }
}
