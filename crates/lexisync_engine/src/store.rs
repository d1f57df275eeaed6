//! Durable storage of processing state and merge snapshots.
//!
//! Layout under the state directory:
//!
//! ```text
//! <state_dir>/
//! ├─ <project>.state          # ProcessingState, JSON
//! └─ <project>.snapshot.json  # entries as of the last completed sync
//! ```
//!
//! Both files are written with the write-then-rename pattern, so a crash
//! leaves either the old or the new content on disk.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::state::{ProcessingState, SendReceiveState};
use lexisync_merge::Entry;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Reads and writes per-project state files.
#[derive(Debug, Clone)]
pub struct StateStore {
    config: SyncConfig,
}

impl StateStore {
    /// Creates a store over the state directory of `config`.
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// Loads the state of `project`.
    ///
    /// Never fails: a missing, empty or unreadable file yields a fresh
    /// `CLONING` state.
    pub fn load(&self, project: &str) -> ProcessingState {
        let path = self.config.state_dir().join(format!("{project}.state"));
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(_) => return ProcessingState::new(project),
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            return ProcessingState::new(project);
        }

        match serde_json::from_slice::<ProcessingState>(&data) {
            Ok(mut state) => {
                state.project_code = project.to_string();
                state
            }
            Err(e) => {
                warn!(project, error = %e, "unreadable state file, starting fresh");
                ProcessingState::new(project)
            }
        }
    }

    /// Persists `state` atomically.
    pub fn save(&self, state: &ProcessingState) -> SyncResult<()> {
        let path = self.config.state_file(&state.project_code)?;
        let data = serde_json::to_vec_pretty(state)?;
        write_atomic(&path, &data)
    }

    /// Loads the entries of the last completed sync.
    ///
    /// A missing snapshot is empty. An unreadable one is logged and treated
    /// as empty, which makes the next merge treat every entry as new.
    pub fn load_snapshot(&self, project: &str) -> SyncResult<Vec<Entry>> {
        let path = self.config.snapshot_file(project);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read(&path)?;
        match serde_json::from_slice(&data) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(project, error = %e, "unreadable snapshot, ignoring it");
                Ok(Vec::new())
            }
        }
    }

    /// Persists the entries of a completed sync atomically.
    pub fn save_snapshot(&self, project: &str, entries: &[Entry]) -> SyncResult<()> {
        self.config.state_file(project)?;
        let data = serde_json::to_vec(entries)?;
        write_atomic(&self.config.snapshot_file(project), &data)
    }
}

/// Write-then-rename with file and directory fsync.
fn write_atomic(path: &Path, data: &[u8]) -> SyncResult<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    if let Some(dir) = path.parent() {
        sync_directory(dir)?;
    }
    Ok(())
}

#[cfg(unix)]
fn sync_directory(dir: &Path) -> SyncResult<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> SyncResult<()> {
    Ok(())
}

/// A processing state that is persisted on every mutation.
pub(crate) struct TrackedState<'a> {
    state: ProcessingState,
    store: &'a StateStore,
}

impl<'a> TrackedState<'a> {
    pub(crate) fn new(state: ProcessingState, store: &'a StateStore) -> Self {
        Self { state, store }
    }

    pub(crate) fn get(&self) -> &ProcessingState {
        &self.state
    }

    pub(crate) fn sr_state(&self) -> SendReceiveState {
        self.state.sr_state
    }

    /// Applies `mutate` to a copy, saves it, and only then replaces the
    /// held state. A failed save leaves the held state untouched.
    pub(crate) fn update(&mut self, mutate: impl FnOnce(&mut ProcessingState)) -> SyncResult<()> {
        let from = self.state.sr_state;
        let mut next = self.state.clone();
        mutate(&mut next);
        self.store.save(&next)?;
        self.state = next;
        if from != self.state.sr_state {
            info!(
                project = %self.state.project_code,
                from = %from,
                to = %self.state.sr_state,
                "state transition"
            );
        }
        Ok(())
    }

    pub(crate) fn transition(&mut self, to: SendReceiveState) -> SyncResult<()> {
        self.update(|state| state.transition(to))
    }

    pub(crate) fn into_inner(self) -> ProcessingState {
        self.state
    }
}
