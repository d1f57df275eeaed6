//! Synchronization orchestrator.
//!
//! A cycle runs a fixed sequence of [`Step`]s for one project:
//!
//! 1. `EnsureClone`: clone the project if needed; after a fresh clone into
//!    an empty store, copy every model entry to the store.
//! 2. `LoadModel`: pull, then read the model entries in store shape.
//! 3. `Synchronize`: merge previous/store/model, write the model, commit
//!    and push.
//! 4. `UpdateStore`: write the store, save the snapshot, record the sync
//!    time and return to `IDLE`.
//!
//! The cycle stops after a step that leaves the project in `ERROR` or
//! `HOLD`. Every state mutation is persisted before the next action runs,
//! and the state never passes `SYNCING` before all writes are done.

use crate::collab::{DocumentStore, LexiconModel, ModelChange, Repository};
use crate::config::SyncConfig;
use crate::convert::{to_model, to_store};
use crate::error::{FailureClass, SyncError, SyncResult};
use crate::lock::ProcessLock;
use crate::state::{ProcessingState, SendReceiveState};
use crate::store::{StateStore, TrackedState};
use chrono::{DateTime, Utc};
use lexisync_merge::{merge_project, Entry, MergeStats, ProjectMerge, WriteAction};
use lexisync_spantext::WritingSystemRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// One step of a sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Clone the project if there is no usable working copy.
    EnsureClone,
    /// Pull and read the desktop model.
    LoadModel,
    /// Merge and write back to the model and repository.
    Synchronize,
    /// Write back to the document store and finish.
    UpdateStore,
}

impl Step {
    /// Every step, in execution order.
    pub const ALL: [Step; 4] = [
        Step::EnsureClone,
        Step::LoadModel,
        Step::Synchronize,
        Step::UpdateStore,
    ];

    /// Returns the step that follows this one.
    pub fn next(&self) -> Option<Step> {
        match self {
            Step::EnsureClone => Some(Step::LoadModel),
            Step::LoadModel => Some(Step::Synchronize),
            Step::Synchronize => Some(Step::UpdateStore),
            Step::UpdateStore => None,
        }
    }

    /// Returns the 1-based position of the step.
    pub fn number(&self) -> u32 {
        match self {
            Step::EnsureClone => 1,
            Step::LoadModel => 2,
            Step::Synchronize => 3,
            Step::UpdateStore => 4,
        }
    }

    /// Returns the step name.
    pub fn name(&self) -> &'static str {
        match self {
            Step::EnsureClone => "ensure-clone",
            Step::LoadModel => "load-model",
            Step::Synchronize => "synchronize",
            Step::UpdateStore => "update-store",
        }
    }
}

/// Summary of one completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Project code.
    pub project: String,
    /// Steps that ran, in order.
    pub steps: Vec<Step>,
    /// True if an initial clone ran.
    pub cloned: bool,
    /// True if the initial model-to-store transfer ran.
    pub initial_transfer: bool,
    /// Merge counters.
    pub stats: MergeStats,
    /// State after the cycle.
    pub state: ProcessingState,
}

/// Data carried between the steps of one cycle.
struct Cycle {
    project: String,
    started_at: DateTime<Utc>,
    timer: Instant,
    cloned: bool,
    initial_transfer: bool,
    writing_systems: WritingSystemRegistry,
    model_entries: Vec<Entry>,
    merge: ProjectMerge,
}

/// Runs sync cycles against the three collaborators.
pub struct Orchestrator<R: Repository, S: DocumentStore, M: LexiconModel> {
    config: SyncConfig,
    states: StateStore,
    repository: Arc<R>,
    store: Arc<S>,
    model: Arc<M>,
}

impl<R: Repository, S: DocumentStore, M: LexiconModel> Orchestrator<R, S, M> {
    /// Creates an orchestrator.
    pub fn new(config: SyncConfig, repository: R, store: S, model: M) -> Self {
        Self {
            states: StateStore::new(config.clone()),
            config,
            repository: Arc::new(repository),
            store: Arc::new(store),
            model: Arc::new(model),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the repository collaborator.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the document store collaborator.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the desktop model collaborator.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns the persisted state of `project`.
    pub fn state(&self, project: &str) -> ProcessingState {
        self.states.load(project)
    }

    /// Releases a project from `HOLD` or `ERROR` back to `IDLE`.
    pub fn release(&self, project: &str) -> SyncResult<ProcessingState> {
        let state = self.states.load(project);
        if !matches!(
            state.sr_state,
            SendReceiveState::Hold | SendReceiveState::Error
        ) {
            return Ok(state);
        }
        let mut tracked = TrackedState::new(state, &self.states);
        tracked.update(ProcessingState::release)?;
        Ok(tracked.into_inner())
    }

    /// Runs one cycle for `project` under the process lock.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Locked`] if another instance runs; no state is touched
    /// - [`SyncError::OnHold`] if the project is in `HOLD`
    /// - [`SyncError::Recoverable`] after recording `ERROR`
    /// - any other error after recording `HOLD`
    pub fn run(&self, project: &str) -> SyncResult<CycleReport> {
        let _lock = ProcessLock::acquire(&self.config.lock_file())?;
        self.run_locked(project)
    }

    /// Runs one cycle per project, in order, under a single lock.
    ///
    /// A failing project does not stop the others.
    pub fn run_projects(
        &self,
        projects: &[&str],
    ) -> SyncResult<Vec<(String, SyncResult<CycleReport>)>> {
        let _lock = ProcessLock::acquire(&self.config.lock_file())?;
        Ok(projects
            .iter()
            .map(|project| (project.to_string(), self.run_locked(project)))
            .collect())
    }

    fn run_locked(&self, project: &str) -> SyncResult<CycleReport> {
        let state = self.states.load(project);
        if !state.sr_state.can_start_cycle() {
            warn!(project, "project on hold, skipping");
            return Err(SyncError::OnHold {
                project: project.to_string(),
            });
        }

        let mut cycle = Cycle {
            project: project.to_string(),
            started_at: Utc::now(),
            timer: Instant::now(),
            cloned: false,
            initial_transfer: false,
            writing_systems: WritingSystemRegistry::new(),
            model_entries: Vec::new(),
            merge: ProjectMerge::default(),
        };
        let mut tracked = TrackedState::new(state, &self.states);
        if tracked.sr_state() == SendReceiveState::Error {
            info!(project, "restarting project after error");
            tracked.transition(SendReceiveState::Idle)?;
        }
        let total = Step::ALL.len() as u32;
        tracked.update(|state| state.begin_cycle(cycle.started_at, total))?;

        let mut steps = Vec::new();
        let mut next = Some(Step::EnsureClone);
        while let Some(step) = next {
            let elapsed = cycle.timer.elapsed().as_secs();
            tracked.update(|state| state.set_progress(step.number(), elapsed))?;
            debug!(project, step = step.name(), "running step");
            steps.push(step);

            if let Err(err) = self.run_step(step, &mut cycle, &mut tracked) {
                return Err(self.fail(step, err, &mut tracked));
            }
            if matches!(
                tracked.sr_state(),
                SendReceiveState::Error | SendReceiveState::Hold
            ) {
                break;
            }
            next = step.next();
        }

        Ok(CycleReport {
            project: cycle.project,
            steps,
            cloned: cycle.cloned,
            initial_transfer: cycle.initial_transfer,
            stats: cycle.merge.stats,
            state: tracked.into_inner(),
        })
    }

    fn run_step(
        &self,
        step: Step,
        cycle: &mut Cycle,
        tracked: &mut TrackedState<'_>,
    ) -> SyncResult<()> {
        match step {
            Step::EnsureClone => self.ensure_clone(cycle, tracked),
            Step::LoadModel => self.load_model(cycle),
            Step::Synchronize => self.synchronize(cycle, tracked),
            Step::UpdateStore => self.update_store(cycle, tracked),
        }
    }

    fn ensure_clone(&self, cycle: &mut Cycle, tracked: &mut TrackedState<'_>) -> SyncResult<()> {
        let project = cycle.project.clone();
        let path = self.config.working_copy(&project);
        let has_copy = self.repository.has_working_copy(&path);
        if has_copy && tracked.sr_state() != SendReceiveState::Cloning {
            debug!(project = %project, "working copy present, no clone needed");
            return Ok(());
        }

        info!(project = %project, has_copy, "running initial clone");
        if tracked.sr_state() != SendReceiveState::Cloning {
            tracked.transition(SendReceiveState::Cloning)?;
        }
        let source = self.config.clone_source(&project);
        self.repository.clone_project(&project, &source, &path)?;
        cycle.cloned = true;
        tracked.transition(SendReceiveState::Cloned)?;

        if self.store.last_synced(&project)?.is_none() && self.store.entries(&project)?.is_empty() {
            let entries = self.read_model(cycle)?;
            info!(project = %project, entries = entries.len(), "initial transfer to store");
            self.store.write_entries(&project, &entries)?;
            self.states.save_snapshot(&project, &entries)?;
            self.store.set_last_synced(&project, cycle.started_at.max(Utc::now()))?;
            cycle.initial_transfer = true;
        }
        Ok(())
    }

    fn load_model(&self, cycle: &mut Cycle) -> SyncResult<()> {
        self.repository.pull(&cycle.project)?;
        cycle.model_entries = self.read_model(cycle)?;
        Ok(())
    }

    fn read_model(&self, cycle: &mut Cycle) -> SyncResult<Vec<Entry>> {
        cycle.writing_systems = self.model.writing_systems(&cycle.project)?;
        self.model
            .entries(&cycle.project)?
            .iter()
            .map(|entry| to_store(entry, &cycle.writing_systems))
            .collect()
    }

    fn synchronize(&self, cycle: &mut Cycle, tracked: &mut TrackedState<'_>) -> SyncResult<()> {
        let project = cycle.project.as_str();
        tracked.transition(SendReceiveState::Syncing)?;

        let previous = self.states.load_snapshot(project)?;
        let store_entries = self.store.entries(project)?;
        let merge = merge_project(&previous, &store_entries, &cycle.model_entries, cycle.started_at)?;
        let stats = merge.stats;
        info!(
            project,
            entries = stats.entries,
            unchanged = stats.unchanged,
            created_in_store = stats.created_in_store,
            created_in_model = stats.created_in_model,
            deleted_in_store = stats.deleted_in_store,
            deleted_in_model = stats.deleted_in_model,
            conflicts = stats.conflicts,
            "merge complete"
        );

        let changes = merge
            .model_writes()
            .map(|outcome| match outcome.model_action {
                WriteAction::Delete => Ok(ModelChange::Delete(outcome.merged.guid)),
                _ => Ok(ModelChange::Upsert(to_model(
                    &outcome.merged,
                    &cycle.writing_systems,
                )?)),
            })
            .collect::<SyncResult<Vec<_>>>()?;
        if !changes.is_empty() {
            self.model.apply(project, &changes)?;
        }
        self.repository
            .commit_and_push(project, self.config.commit_message())?;

        cycle.merge = merge;
        Ok(())
    }

    fn update_store(&self, cycle: &mut Cycle, tracked: &mut TrackedState<'_>) -> SyncResult<()> {
        let project = cycle.project.as_str();
        let writes: Vec<Entry> = cycle
            .merge
            .store_writes()
            .map(|outcome| outcome.merged.clone())
            .collect();
        if !writes.is_empty() {
            self.store.write_entries(project, &writes)?;
        }
        self.states.save_snapshot(project, &cycle.merge.snapshot())?;
        self.store
            .set_last_synced(project, cycle.started_at.max(Utc::now()))?;

        let millis = u64::try_from(cycle.timer.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracked.update(|state| state.complete(millis))?;
        info!(project, millis, "sync complete");
        Ok(())
    }

    /// Records a failed step and returns the error to surface.
    fn fail(&self, step: Step, err: SyncError, tracked: &mut TrackedState<'_>) -> SyncError {
        let project = tracked.get().project_code.clone();
        let known = match &err {
            SyncError::Clone(failure) => failure.code().map(|code| {
                let message = format!(
                    "Recoverable error during initial clone of {project}: {}",
                    failure.message()
                );
                (code, message)
            }),
            SyncError::Recoverable { code, message } => Some((*code, message.clone())),
            _ => None,
        };

        let (err, recorded) = match known {
            Some((code, message)) => {
                warn!(project = %project, %code, "{message}");
                let recorded = tracked.update(|state| state.set_error(code, message.as_str()));
                (SyncError::recoverable(code, message), recorded)
            }
            None => {
                error!(project = %project, step = step.name(), error = %err, "step failed, holding project");
                let message = err.to_string();
                let transient = err.classify() == FailureClass::Transient;
                let recorded = tracked.update(|state| state.hold(message, transient));
                (err, recorded)
            }
        };

        if let Err(save_err) = recorded {
            error!(project = %project, error = %save_err, "could not persist failure state");
        }
        err
    }
}
