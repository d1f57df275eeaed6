//! Process-wide advisory lock.

use crate::error::{SyncError, SyncResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Exclusive advisory lock on the orchestrator lock file.
///
/// Only one orchestrator per host can hold it. The lock is released when
/// the value is dropped.
#[derive(Debug)]
pub struct ProcessLock {
    path: PathBuf,
    _file: File,
}

impl ProcessLock {
    /// Tries to take the lock without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Locked`] if another holder has it, or an I/O
    /// error if the lock file cannot be opened.
    pub fn acquire(path: &Path) -> SyncResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            warn!(path = %path.display(), "lock held by another instance");
            return Err(SyncError::Locked);
        }
        debug!(path = %path.display(), "lock acquired");

        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
        })
    }

    /// Returns the lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
