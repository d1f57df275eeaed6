//! Test fixtures and sync helpers.
//!
//! Provides a harness that runs the orchestrator against in-memory
//! collaborators in a temporary base directory, plus sample data.

use chrono::Utc;
use lexisync_engine::{
    CycleReport, MemoryDocumentStore, MemoryLexiconModel, MemoryRepository, ModelEntry,
    ModelField, Orchestrator, SyncConfig, SyncResult,
};
use lexisync_merge::{Entry, Sense};
use lexisync_spantext::{RichText, WritingSystemRegistry, WritingSystems};
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;
use uuid::Uuid;

/// Project code used by the fixtures.
pub const PROJECT: &str = "test-kuma";

/// Default writing system of the sample project.
pub const DEFAULT_WS: &str = "en";

/// Other writing systems of the sample project.
pub const OTHER_WS: [&str; 3] = ["fr", "grc", "seh"];

/// Span text with two tagged spans between untagged text.
pub const TWO_LANGS: &str =
    r#"foo<span lang="grc">σπιθ&lt;αμή</span>bar<span lang="fr">port&gt;ée</span>baz"#;

/// Span text with both `<br>` spellings.
pub const BR_TAGS: &str = "strings with <br/> or <br /> should have them stripped";

/// Span text exercising every class token kind.
pub const ALL_TOKENS: &str = r#"foo<span lang="grc" class="guid_01234567-1234-4321-89ab-0123456789ab styleName_Bold propi_4_ktptSuperscript_1_0 props_1_ktptFontFamily_Times_SPACE_New_SPACE_Roman">σπιθαμή</span>bar"#;

/// The orchestrator type used by the harness.
pub type MemoryOrchestrator =
    Orchestrator<MemoryRepository, MemoryDocumentStore, MemoryLexiconModel>;

/// Returns the writing systems of the sample project.
pub fn sample_registry() -> WritingSystemRegistry {
    WritingSystemRegistry::with_tags(std::iter::once(DEFAULT_WS).chain(OTHER_WS))
}

/// Creates a model entry with a lexeme and one sense defined in the
/// default writing system.
pub fn model_entry(lexeme: &str, definition: &str) -> ModelEntry {
    let ws = sample_registry()
        .ws_id(DEFAULT_WS)
        .expect("default writing system is registered");
    Entry::new(Uuid::new_v4(), Utc::now())
        .with_field(
            "lexeme",
            ModelField::MultiString(BTreeMap::from([(
                DEFAULT_WS.to_string(),
                lexeme.to_string(),
            )])),
        )
        .with_sense(Sense::new(Uuid::new_v4()).with_field(
            "definition",
            ModelField::Rich(BTreeMap::from([(
                DEFAULT_WS.to_string(),
                RichText::in_ws(definition, ws),
            )])),
        ))
}

/// An orchestrator over in-memory collaborators with automatic cleanup.
pub struct SyncHarness {
    /// The orchestrator.
    pub orchestrator: MemoryOrchestrator,
    /// The temporary base directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl SyncHarness {
    /// Creates a harness with the default configuration.
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    /// Creates a harness, letting `configure` adjust the configuration.
    pub fn with_config(configure: impl FnOnce(SyncConfig) -> SyncConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = configure(SyncConfig::new(temp_dir.path()));
        let orchestrator = Orchestrator::new(
            config,
            MemoryRepository::new(),
            MemoryDocumentStore::new(),
            MemoryLexiconModel::new(sample_registry()),
        );
        Self {
            orchestrator,
            temp_dir,
        }
    }

    /// Returns the base directory.
    pub fn base_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Adds entries to the desktop model of `project`.
    pub fn seed_model(&self, project: &str, entries: impl IntoIterator<Item = ModelEntry>) {
        for entry in entries {
            self.orchestrator.model().upsert(project, entry);
        }
    }

    /// Runs one cycle.
    pub fn run(&self, project: &str) -> SyncResult<CycleReport> {
        self.orchestrator.run(project)
    }
}

impl Default for SyncHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SyncHarness {
    type Target = MemoryOrchestrator;

    fn deref(&self) -> &Self::Target {
        &self.orchestrator
    }
}
