//! Merge decisions and conflict records.

use crate::field::FieldValue;
use serde::{Deserialize, Serialize};

/// One of the two stores being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The web-facing document store.
    Store,
    /// The desktop data model.
    Model,
}

impl Side {
    /// Returns the other side.
    pub fn other(&self) -> Self {
        match self {
            Side::Store => Side::Model,
            Side::Model => Side::Store,
        }
    }

    /// Short name used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Store => "store",
            Side::Model => "model",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of decision the policy made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// The element exists only on the winning side and is created on the other.
    Created,
    /// A deletion on the winning side is applied to the other.
    Deleted,
    /// An element removed on one side is kept because the winner edited it.
    Restored,
    /// A deleted entry is brought back by a live edit.
    Undeleted,
    /// Only the winning side changed the field.
    FieldChanged,
    /// Both sides changed the field; the winner's value is kept.
    Conflict,
}

/// A single annotated decision of the merge policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Location of the decided element, e.g. `<entry>/senses/<sense>.gloss`.
    pub path: String,
    /// The side whose state survived.
    pub winner: Side,
    /// Kind of decision.
    pub kind: DecisionKind,
}

impl Decision {
    /// Creates a decision.
    pub fn new(path: impl Into<String>, winner: Side, kind: DecisionKind) -> Self {
        Self {
            path: path.into(),
            winner,
            kind,
        }
    }
}

/// Both sides changed the same field since the last sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Location of the field.
    pub path: String,
    /// Value at the last sync, if the field existed then.
    pub previous: Option<FieldValue>,
    /// Current document-store value.
    pub store: Option<FieldValue>,
    /// Current desktop-model value.
    pub model: Option<FieldValue>,
    /// The side whose value was kept.
    pub winner: Side,
}

impl Conflict {
    /// Returns the value that was kept.
    pub fn resolved_value(&self) -> Option<&FieldValue> {
        match self.winner {
            Side::Store => self.store.as_ref(),
            Side::Model => self.model.as_ref(),
        }
    }

    /// Returns true if one side removed the field and the other edited it.
    pub fn is_update_delete(&self) -> bool {
        self.store.is_some() != self.model.is_some()
    }
}

/// Decisions and conflicts collected while merging one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MergeLog {
    pub(crate) decisions: Vec<Decision>,
    pub(crate) conflicts: Vec<Conflict>,
}

impl MergeLog {
    pub(crate) fn decide(&mut self, path: impl Into<String>, winner: Side, kind: DecisionKind) {
        self.decisions.push(Decision::new(path, winner, kind));
    }

    pub(crate) fn conflict(&mut self, conflict: Conflict) {
        self.decisions
            .push(Decision::new(conflict.path.clone(), conflict.winner, DecisionKind::Conflict));
        self.conflicts.push(conflict);
    }
}
