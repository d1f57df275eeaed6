//! Per-project processing state.

use crate::error::ErrorCode;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SendReceiveState {
    /// Initial clone pending or in progress.
    Cloning,
    /// Initial clone finished.
    Cloned,
    /// Merge and write-back in progress.
    Syncing,
    /// Last cycle completed.
    Idle,
    /// Paused after an unexpected failure.
    Hold,
    /// Stopped by a known failure; see the error code.
    Error,
}

impl SendReceiveState {
    /// Returns true while a cycle is running.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SendReceiveState::Cloning | SendReceiveState::Cloned | SendReceiveState::Syncing
        )
    }

    /// Returns true if a new cycle may start.
    pub fn can_start_cycle(&self) -> bool {
        !matches!(self, SendReceiveState::Hold)
    }

    /// Returns the name as written in the state file.
    pub fn as_str(&self) -> &'static str {
        match self {
            SendReceiveState::Cloning => "CLONING",
            SendReceiveState::Cloned => "CLONED",
            SendReceiveState::Syncing => "SYNCING",
            SendReceiveState::Idle => "IDLE",
            SendReceiveState::Hold => "HOLD",
            SendReceiveState::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for SendReceiveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted record of one project's progress.
///
/// The mutators below are pure; every one of them advances
/// `last_state_change`. Persistence is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessingState {
    /// Current lifecycle state.
    #[serde(rename = "SRState")]
    pub sr_state: SendReceiveState,
    /// Time of the last mutation; strictly increasing.
    pub last_state_change: DateTime<Utc>,
    /// Start of the current or last cycle.
    pub start_timestamp: Option<DateTime<Utc>>,
    /// Progress of the current cycle, 0 to 100.
    pub percent_complete: u32,
    /// Seconds spent in the current or last cycle.
    pub elapsed_time_seconds: u64,
    /// Estimated seconds left, from the previous run's duration.
    pub time_remaining_seconds: u64,
    /// Number of steps in a cycle.
    pub total_steps: u32,
    /// Step currently running, 1-based.
    pub current_step: u32,
    /// Consecutive holds caused by transient failures.
    pub retry_counter: u32,
    /// Reason for the last `ERROR` or `HOLD`.
    pub error_message: Option<String>,
    /// Code of the last `ERROR`.
    pub error_code: Option<ErrorCode>,
    /// Duration of the last completed cycle.
    #[serde(rename = "PreviousRunTotalMilliseconds")]
    pub previous_run_total_millis: u64,
    /// Project the record belongs to.
    pub project_code: String,
}

impl ProcessingState {
    /// Creates the state of a project seen for the first time.
    pub fn new(project_code: impl Into<String>) -> Self {
        Self {
            sr_state: SendReceiveState::Cloning,
            last_state_change: Utc::now(),
            start_timestamp: None,
            percent_complete: 0,
            elapsed_time_seconds: 0,
            time_remaining_seconds: 0,
            total_steps: 0,
            current_step: 0,
            retry_counter: 0,
            error_message: None,
            error_code: None,
            previous_run_total_millis: 0,
            project_code: project_code.into(),
        }
    }

    /// Advances `last_state_change` to now, or just past its old value if
    /// the clock has not moved.
    pub fn touch(&mut self) {
        self.last_state_change = Utc::now().max(self.last_state_change + Duration::microseconds(1));
    }

    /// Moves to `state`.
    pub fn transition(&mut self, state: SendReceiveState) {
        self.sr_state = state;
        self.touch();
    }

    /// Starts a new cycle, clearing any earlier error.
    pub fn begin_cycle(&mut self, started_at: DateTime<Utc>, total_steps: u32) {
        self.start_timestamp = Some(started_at);
        self.total_steps = total_steps;
        self.current_step = 0;
        self.percent_complete = 0;
        self.elapsed_time_seconds = 0;
        self.time_remaining_seconds = self.previous_run_total_millis / 1000;
        self.error_code = None;
        self.error_message = None;
        self.touch();
    }

    /// Records that step `step` (1-based) has started.
    pub fn set_progress(&mut self, step: u32, elapsed_seconds: u64) {
        self.current_step = step;
        if self.total_steps > 0 {
            self.percent_complete = step.saturating_sub(1) * 100 / self.total_steps;
        }
        self.elapsed_time_seconds = elapsed_seconds;
        self.time_remaining_seconds =
            (self.previous_run_total_millis / 1000).saturating_sub(elapsed_seconds);
        self.touch();
    }

    /// Stops the cycle with a known error.
    pub fn set_error(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.error_code = Some(code);
        self.error_message = Some(message.into());
        self.transition(SendReceiveState::Error);
    }

    /// Parks the project in `HOLD`. Transient failures count as a retry.
    pub fn hold(&mut self, message: impl Into<String>, transient: bool) {
        self.error_message = Some(message.into());
        if transient {
            self.retry_counter += 1;
        }
        self.transition(SendReceiveState::Hold);
    }

    /// Completes the cycle and returns to `IDLE`.
    pub fn complete(&mut self, total_millis: u64) {
        self.current_step = self.total_steps;
        self.percent_complete = 100;
        self.elapsed_time_seconds = total_millis / 1000;
        self.time_remaining_seconds = 0;
        self.previous_run_total_millis = total_millis;
        self.retry_counter = 0;
        self.error_code = None;
        self.error_message = None;
        self.transition(SendReceiveState::Idle);
    }

    /// Releases a held or failed project back to `IDLE`.
    pub fn release(&mut self) {
        self.error_code = None;
        self.error_message = None;
        self.transition(SendReceiveState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_cloning() {
        let state = ProcessingState::new("proja");
        assert_eq!(state.sr_state, SendReceiveState::Cloning);
        assert_eq!(state.project_code, "proja");
        assert!(state.sr_state.is_active());
    }

    #[test]
    fn every_mutation_advances_last_state_change() {
        let mut state = ProcessingState::new("proja");
        let mut last = state.last_state_change;
        for _ in 0..100 {
            state.transition(SendReceiveState::Syncing);
            assert!(state.last_state_change > last);
            last = state.last_state_change;
        }
    }

    #[test]
    fn error_and_hold_keep_a_message() {
        let mut state = ProcessingState::new("proja");
        state.set_error(ErrorCode::EmptyProject, "empty");
        assert_eq!(state.sr_state, SendReceiveState::Error);
        assert_eq!(state.error_message.as_deref(), Some("empty"));

        state.hold("push failed", true);
        assert_eq!(state.sr_state, SendReceiveState::Hold);
        assert_eq!(state.retry_counter, 1);
        assert!(!state.sr_state.can_start_cycle());

        state.release();
        assert_eq!(state.sr_state, SendReceiveState::Idle);
        assert_eq!(state.error_message, None);
    }

    #[test]
    fn progress_and_completion() {
        let mut state = ProcessingState::new("proja");
        state.previous_run_total_millis = 10_000;
        state.begin_cycle(Utc::now(), 4);
        assert_eq!(state.time_remaining_seconds, 10);

        state.set_progress(3, 4);
        assert_eq!(state.percent_complete, 50);
        assert_eq!(state.time_remaining_seconds, 6);

        state.retry_counter = 2;
        state.complete(7_500);
        assert_eq!(state.sr_state, SendReceiveState::Idle);
        assert_eq!(state.percent_complete, 100);
        assert_eq!(state.current_step, 4);
        assert_eq!(state.retry_counter, 0);
        assert_eq!(state.previous_run_total_millis, 7_500);
    }

    #[test]
    fn json_field_order_and_names() {
        let mut state = ProcessingState::new("proja");
        state.transition(SendReceiveState::Syncing);
        let json = serde_json::to_string(&state).unwrap();

        let keys = [
            "SRState",
            "LastStateChange",
            "StartTimestamp",
            "PercentComplete",
            "ElapsedTimeSeconds",
            "TimeRemainingSeconds",
            "TotalSteps",
            "CurrentStep",
            "RetryCounter",
            "ErrorMessage",
            "ErrorCode",
            "PreviousRunTotalMilliseconds",
            "ProjectCode",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|key| json.find(&format!("\"{key}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(json.contains("\"SRState\":\"SYNCING\""));
    }

    #[test]
    fn error_code_is_written_by_name() {
        let mut state = ProcessingState::new("proja");
        state.set_error(ErrorCode::NoFlexProject, "not a project");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"ErrorCode\":\"NoFlexProject\""));

        let back: ProcessingState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
