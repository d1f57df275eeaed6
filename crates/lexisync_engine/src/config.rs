//! Configuration for the sync orchestrator.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default base directory of a send/receive installation.
pub const DEFAULT_BASE_DIR: &str = "/var/lib/languageforge/lexicon/sendreceive";

/// Default commit message for merge commits.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Language Forge S/R";

/// Configuration for sync operations.
///
/// Relative `state_dir`, `work_dir` and `lock_file` paths are resolved
/// under `base_dir`; absolute paths are used as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    base_dir: PathBuf,
    state_dir: PathBuf,
    work_dir: PathBuf,
    lock_file: PathBuf,
    repository_uri: Option<String>,
    commit_message: String,
}

impl SyncConfig {
    /// Creates a configuration rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            state_dir: PathBuf::from("state"),
            work_dir: PathBuf::from("webwork"),
            lock_file: PathBuf::from("lexisync.lock"),
            repository_uri: None,
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }

    /// Sets the state directory.
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    /// Sets the directory holding working copies.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Sets the process lock file.
    pub fn with_lock_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_file = path.into();
        self
    }

    /// Overrides the clone source.
    pub fn with_repository_uri(mut self, uri: impl Into<String>) -> Self {
        self.repository_uri = Some(uri.into());
        self
    }

    /// Sets the commit message used for merge commits.
    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    /// Returns the base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the resolved state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.resolve(&self.state_dir)
    }

    /// Returns the resolved working-copy directory.
    pub fn work_dir(&self) -> PathBuf {
        self.resolve(&self.work_dir)
    }

    /// Returns the resolved lock file path.
    pub fn lock_file(&self) -> PathBuf {
        self.resolve(&self.lock_file)
    }

    /// Returns the commit message.
    pub fn commit_message(&self) -> &str {
        &self.commit_message
    }

    /// Returns the clone source for `project`: the override if set,
    /// otherwise the project code.
    pub fn clone_source(&self, project: &str) -> String {
        match &self.repository_uri {
            Some(uri) => uri.clone(),
            None => project.to_string(),
        }
    }

    /// Returns `<state_dir>/<project>.state`, creating the state directory.
    pub fn state_file(&self, project: &str) -> io::Result<PathBuf> {
        let dir = self.state_dir();
        fs::create_dir_all(&dir)?;
        Ok(dir.join(format!("{project}.state")))
    }

    /// Returns `<state_dir>/<project>.snapshot.json`.
    pub fn snapshot_file(&self, project: &str) -> PathBuf {
        self.state_dir().join(format!("{project}.snapshot.json"))
    }

    /// Returns `<work_dir>/<project>`.
    pub fn working_copy(&self, project: &str) -> PathBuf {
        self.work_dir().join(project)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_resolve_under_base() {
        let config = SyncConfig::default();
        assert_eq!(config.base_dir(), Path::new(DEFAULT_BASE_DIR));
        assert_eq!(config.state_dir(), Path::new(DEFAULT_BASE_DIR).join("state"));
        assert_eq!(config.work_dir(), Path::new(DEFAULT_BASE_DIR).join("webwork"));
        assert_eq!(config.lock_file(), Path::new(DEFAULT_BASE_DIR).join("lexisync.lock"));
        assert_eq!(config.commit_message(), "Language Forge S/R");
    }

    #[test]
    fn builder_overrides() {
        let config = SyncConfig::new("/srv/sr")
            .with_state_dir("/tmp/states")
            .with_work_dir("copies")
            .with_repository_uri("https://hg.example.org/proj")
            .with_commit_message("merge");

        assert_eq!(config.state_dir(), PathBuf::from("/tmp/states"));
        assert_eq!(config.work_dir(), PathBuf::from("/srv/sr/copies"));
        assert_eq!(config.working_copy("proj"), PathBuf::from("/srv/sr/copies/proj"));
        assert_eq!(config.clone_source("proj"), "https://hg.example.org/proj");
        assert_eq!(config.commit_message(), "merge");
        assert_eq!(SyncConfig::new("/x").clone_source("abc"), "abc");
    }

    #[test]
    fn state_file_creates_directory() {
        let temp = tempdir().unwrap();
        let config = SyncConfig::new(temp.path());
        let path = config.state_file("proja").unwrap();
        assert_eq!(path, temp.path().join("state").join("proja.state"));
        assert!(temp.path().join("state").is_dir());
        assert_eq!(
            config.snapshot_file("proja"),
            temp.path().join("state").join("proja.snapshot.json")
        );
    }
}
