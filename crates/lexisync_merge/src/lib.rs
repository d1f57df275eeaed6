//! # LexiSync Merge
//!
//! Three-way diff and merge policy for lexicon entries held in two stores:
//! the web-facing document store and the desktop linguistic model.
//!
//! This crate provides:
//! - [`Entry`], [`Sense`], [`Example`] and [`Picture`], the syncable shape
//! - [`FieldValue`] for document-store field values
//! - [`merge_entry`] deciding the outcome for one entry
//! - [`merge_project`] merging a whole project by GUID
//! - [`Decision`] and [`Conflict`] annotations explaining every outcome
//!
//! ## Rules
//!
//! - An entry only in the model is created in the store.
//! - An entry only in the store with no previous record is created in the
//!   model.
//! - An entry the model removed is flagged deleted in the store, unless the
//!   store edited it since the last sync.
//! - A live model edit beats a store-side deletion flag.
//! - Fields changed on one side take that side's value; fields changed on
//!   both sides keep the store value.
//! - Senses, examples and pictures follow the same rules, keyed by GUID.
//! - Any change bumps both modification times past every input and to no
//!   earlier than the merge start.
//!
//! This is a pure crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod conflict;
mod entry;
mod error;
mod field;
mod policy;
mod project;

pub use conflict::{Conflict, Decision, DecisionKind, Side};
pub use entry::{Entry, Example, Picture, Sense};
pub use error::{MergeError, MergeResult};
pub use field::{same_fields, same_value, FieldValue, Fields};
pub use policy::{bumped_timestamp, merge_entry, EntryOutcome, WriteAction};
pub use project::{merge_project, MergeStats, ProjectMerge};
