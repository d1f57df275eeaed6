//! External collaborators of the orchestrator.
//!
//! The orchestrator talks to three systems it does not own: the
//! version-control repository, the document store and the desktop data
//! model. Each is a trait so that transports can be swapped; in-memory
//! implementations are provided for tests and tooling.

use crate::convert::ModelEntry;
use crate::error::{CloneFailure, SyncError, SyncResult};
use chrono::{DateTime, Utc};
use lexisync_merge::Entry;
use lexisync_spantext::WritingSystemRegistry;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Version-control transport for the desktop project.
pub trait Repository: Send + Sync {
    /// Returns true if a working copy exists at `path`.
    fn has_working_copy(&self, path: &Path) -> bool;

    /// Clones `source` into `path`.
    ///
    /// Named failures are reported as [`SyncError::Clone`].
    fn clone_project(&self, project: &str, source: &str, path: &Path) -> SyncResult<()>;

    /// Pulls remote changes into the working copy.
    fn pull(&self, project: &str) -> SyncResult<()>;

    /// Commits local changes and pushes them.
    fn commit_and_push(&self, project: &str, message: &str) -> SyncResult<()>;
}

/// The web-facing document store.
pub trait DocumentStore: Send + Sync {
    /// Returns every entry of `project`, including deleted ones.
    fn entries(&self, project: &str) -> SyncResult<Vec<Entry>>;

    /// Inserts or replaces entries by GUID.
    fn write_entries(&self, project: &str, entries: &[Entry]) -> SyncResult<()>;

    /// Returns the time of the last completed sync.
    fn last_synced(&self, project: &str) -> SyncResult<Option<DateTime<Utc>>>;

    /// Records the time of a completed sync.
    fn set_last_synced(&self, project: &str, at: DateTime<Utc>) -> SyncResult<()>;
}

/// A change applied to the desktop model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelChange {
    /// Create or replace an entry.
    Upsert(ModelEntry),
    /// Remove an entry.
    Delete(Uuid),
}

/// The desktop linguistic data model.
pub trait LexiconModel: Send + Sync {
    /// Returns every live entry of `project`.
    fn entries(&self, project: &str) -> SyncResult<Vec<ModelEntry>>;

    /// Applies changes to `project`.
    fn apply(&self, project: &str, changes: &[ModelChange]) -> SyncResult<()>;

    /// Returns the writing systems of `project`.
    fn writing_systems(&self, project: &str) -> SyncResult<WritingSystemRegistry>;
}

/// An in-memory repository for testing.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    working_copies: Mutex<HashSet<PathBuf>>,
    clone_failure: Mutex<Option<String>>,
    push_failure: Mutex<Option<String>>,
    clones: Mutex<Vec<String>>,
    pulls: Mutex<u32>,
    commits: Mutex<Vec<String>>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an existing working copy.
    pub fn add_working_copy(&self, path: impl Into<PathBuf>) {
        self.working_copies.lock().insert(path.into());
    }

    /// Makes every clone fail with `message`.
    pub fn fail_clone_with(&self, message: impl Into<String>) {
        *self.clone_failure.lock() = Some(message.into());
    }

    /// Makes every push fail with `message`, or succeed again with `None`.
    pub fn fail_push_with(&self, message: Option<String>) {
        *self.push_failure.lock() = message;
    }

    /// Returns the sources cloned so far.
    pub fn clones(&self) -> Vec<String> {
        self.clones.lock().clone()
    }

    /// Returns the number of pulls.
    pub fn pull_count(&self) -> u32 {
        *self.pulls.lock()
    }

    /// Returns the commit messages pushed so far.
    pub fn commits(&self) -> Vec<String> {
        self.commits.lock().clone()
    }
}

impl Repository for MemoryRepository {
    fn has_working_copy(&self, path: &Path) -> bool {
        self.working_copies.lock().contains(path)
    }

    fn clone_project(&self, _project: &str, source: &str, path: &Path) -> SyncResult<()> {
        if let Some(message) = self.clone_failure.lock().clone() {
            return Err(CloneFailure::from_message(message).into());
        }
        self.clones.lock().push(source.to_string());
        self.working_copies.lock().insert(path.to_path_buf());
        Ok(())
    }

    fn pull(&self, _project: &str) -> SyncResult<()> {
        *self.pulls.lock() += 1;
        Ok(())
    }

    fn commit_and_push(&self, _project: &str, message: &str) -> SyncResult<()> {
        if let Some(failure) = self.push_failure.lock().clone() {
            return Err(SyncError::collaborator(failure));
        }
        self.commits.lock().push(message.to_string());
        Ok(())
    }
}

/// An in-memory document store for testing.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    entries: Mutex<HashMap<String, Vec<Entry>>>,
    last_synced: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry with `guid`, if any.
    pub fn entry(&self, project: &str, guid: Uuid) -> Option<Entry> {
        self.entries
            .lock()
            .get(project)
            .and_then(|entries| entries.iter().find(|entry| entry.guid == guid).cloned())
    }

    /// Replaces the entry with the same GUID, or adds it.
    pub fn upsert(&self, project: &str, entry: Entry) {
        upsert(
            self.entries.lock().entry(project.to_string()).or_default(),
            entry,
            |e| e.guid,
        );
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn entries(&self, project: &str) -> SyncResult<Vec<Entry>> {
        Ok(self
            .entries
            .lock()
            .get(project)
            .cloned()
            .unwrap_or_default())
    }

    fn write_entries(&self, project: &str, entries: &[Entry]) -> SyncResult<()> {
        let mut all = self.entries.lock();
        let stored = all.entry(project.to_string()).or_default();
        for entry in entries {
            upsert(stored, entry.clone(), |e| e.guid);
        }
        Ok(())
    }

    fn last_synced(&self, project: &str) -> SyncResult<Option<DateTime<Utc>>> {
        Ok(self.last_synced.lock().get(project).copied())
    }

    fn set_last_synced(&self, project: &str, at: DateTime<Utc>) -> SyncResult<()> {
        self.last_synced.lock().insert(project.to_string(), at);
        Ok(())
    }
}

/// An in-memory desktop model for testing.
#[derive(Debug, Default)]
pub struct MemoryLexiconModel {
    entries: Mutex<HashMap<String, Vec<ModelEntry>>>,
    writing_systems: Mutex<WritingSystemRegistry>,
}

impl MemoryLexiconModel {
    /// Creates a model using `writing_systems` for every project.
    pub fn new(writing_systems: WritingSystemRegistry) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            writing_systems: Mutex::new(writing_systems),
        }
    }

    /// Returns the entry with `guid`, if any.
    pub fn entry(&self, project: &str, guid: Uuid) -> Option<ModelEntry> {
        self.entries
            .lock()
            .get(project)
            .and_then(|entries| entries.iter().find(|entry| entry.guid == guid).cloned())
    }

    /// Replaces the entry with the same GUID, or adds it.
    pub fn upsert(&self, project: &str, entry: ModelEntry) {
        upsert(
            self.entries.lock().entry(project.to_string()).or_default(),
            entry,
            |e| e.guid,
        );
    }

    /// Removes the entry with `guid`.
    pub fn remove(&self, project: &str, guid: Uuid) {
        if let Some(entries) = self.entries.lock().get_mut(project) {
            entries.retain(|entry| entry.guid != guid);
        }
    }
}

impl LexiconModel for MemoryLexiconModel {
    fn entries(&self, project: &str) -> SyncResult<Vec<ModelEntry>> {
        Ok(self
            .entries
            .lock()
            .get(project)
            .cloned()
            .unwrap_or_default())
    }

    fn apply(&self, project: &str, changes: &[ModelChange]) -> SyncResult<()> {
        let mut all = self.entries.lock();
        let entries = all.entry(project.to_string()).or_default();
        for change in changes {
            match change {
                ModelChange::Upsert(entry) => upsert(entries, entry.clone(), |e| e.guid),
                ModelChange::Delete(guid) => entries.retain(|entry| entry.guid != *guid),
            }
        }
        Ok(())
    }

    fn writing_systems(&self, _project: &str) -> SyncResult<WritingSystemRegistry> {
        Ok(self.writing_systems.lock().clone())
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, guid: impl Fn(&T) -> Uuid) {
    let key = guid(&item);
    match items.iter_mut().find(|existing| guid(existing) == key) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ModelField;
    use lexisync_merge::FieldValue;

    #[test]
    fn memory_store_upserts_by_guid() {
        let store = MemoryDocumentStore::new();
        let guid = Uuid::new_v4();
        let entry = Entry::new(guid, Utc::now()).with_field("a", FieldValue::scalar("1"));
        store.write_entries("p", &[entry.clone()]).unwrap();
        store
            .write_entries("p", &[entry.with_field("a", FieldValue::scalar("2"))])
            .unwrap();

        let entries = store.entries("p").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].fields["a"], FieldValue::scalar("2"));
        assert!(store.entries("other").unwrap().is_empty());
        assert_eq!(store.last_synced("p").unwrap(), None);
    }

    #[test]
    fn memory_model_applies_changes() {
        let model = MemoryLexiconModel::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        model.upsert("p", Entry::new(a, Utc::now()));
        model
            .apply(
                "p",
                &[
                    ModelChange::Upsert(
                        Entry::new(b, Utc::now()).with_field("x", ModelField::Scalar("y".into())),
                    ),
                    ModelChange::Delete(a),
                ],
            )
            .unwrap();

        let entries = model.entries("p").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].guid, b);
    }

    #[test]
    fn memory_repository_failures() {
        let repo = MemoryRepository::new();
        let path = Path::new("/work/p");
        assert!(!repo.has_working_copy(path));
        repo.clone_project("p", "p", path).unwrap();
        assert!(repo.has_working_copy(path));

        repo.fail_clone_with("Clone failure: new repository with no commits. Clone deleted.");
        assert!(matches!(
            repo.clone_project("q", "q", Path::new("/work/q")),
            Err(SyncError::Clone(CloneFailure::EmptyProject { .. }))
        ));

        repo.fail_push_with(Some("rejected".into()));
        assert!(repo.commit_and_push("p", "m").is_err());
        repo.fail_push_with(None);
        repo.commit_and_push("p", "m").unwrap();
        assert_eq!(repo.commits(), vec!["m".to_string()]);
    }
}
