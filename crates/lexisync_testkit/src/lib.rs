//! # LexiSync Testkit
//!
//! Test utilities for LexiSync.
//!
//! This crate provides:
//! - Property-based generators for runs, span text and entries
//! - A sync harness running the orchestrator over in-memory collaborators
//! - Sample writing systems, entries and span-text fixtures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lexisync_testkit::prelude::*;
//!
//! #[test]
//! fn first_sync_is_quiet() {
//!     let harness = SyncHarness::new();
//!     harness.seed_model(PROJECT, [model_entry("kuma", "bear")]);
//!     let report = harness.run(PROJECT).unwrap();
//!     assert!(report.initial_transfer);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
