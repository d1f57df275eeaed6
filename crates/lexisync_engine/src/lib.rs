//! # LexiSync Engine
//!
//! Processing state machine and sync orchestrator for lexicon send/receive.
//!
//! This crate provides:
//! - Per-project processing state (`CLONING` → `CLONED` → `SYNCING` → `IDLE`)
//! - Durable state and snapshot files written atomically
//! - A process-wide advisory lock
//! - Collaborator traits for the repository, document store and desktop model
//! - The orchestrator running one cycle per project
//!
//! ## Architecture
//!
//! A cycle runs four steps in order:
//! 1. Ensure a clone exists; after a first clone into an empty store, copy
//!    the model into the store
//! 2. Pull and load the model
//! 3. Merge, write to the model, commit and push
//! 4. Write to the store and finish
//!
//! ## Key Invariants
//!
//! - Every state mutation is persisted before the next action runs
//! - `LastStateChange` strictly increases
//! - A project in `HOLD` is skipped until released
//! - Known clone failures put the project in `ERROR`, anything else in `HOLD`
//! - At most one orchestrator runs per host

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collab;
mod config;
mod convert;
mod error;
mod lock;
mod orchestrator;
mod state;
mod store;

pub use collab::{
    DocumentStore, LexiconModel, MemoryDocumentStore, MemoryLexiconModel, MemoryRepository,
    ModelChange, Repository,
};
pub use config::{SyncConfig, DEFAULT_BASE_DIR, DEFAULT_COMMIT_MESSAGE};
pub use convert::{to_model, to_store, ModelEntry, ModelField};
pub use error::{CloneFailure, ErrorCode, FailureClass, SyncError, SyncResult};
pub use lock::ProcessLock;
pub use orchestrator::{CycleReport, Orchestrator, Step};
pub use state::{ProcessingState, SendReceiveState};
pub use store::StateStore;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
