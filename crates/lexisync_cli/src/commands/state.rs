//! State command implementation.

use lexisync_engine::{ProcessLock, ProcessingState, SendReceiveState, StateStore, SyncConfig};
use std::path::Path;
use tracing::info;

/// Runs `state show`.
pub fn show(base_dir: &Path, code: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = SyncConfig::new(base_dir);
    let has_file = config.state_dir().join(format!("{code}.state")).exists();
    let state = StateStore::new(config).load(code);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        if !has_file {
            println!("No state file for {code}; showing initial state");
            println!();
        }
        print_state(&state);
    }
    Ok(())
}

/// Runs `state release`.
pub fn release(base_dir: &Path, code: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = SyncConfig::new(base_dir);
    let _lock = ProcessLock::acquire(&config.lock_file())?;
    let states = StateStore::new(config);

    match release_state(&states, code)? {
        Some(previous) => {
            info!(project = code, from = %previous, "released project");
            println!("✓ {code}: {previous} → {}", SendReceiveState::Idle);
        }
        None => {
            let state = states.load(code);
            println!("{code} is {}; nothing to release", state.sr_state);
        }
    }
    Ok(())
}

/// Moves a project in `HOLD` or `ERROR` to `IDLE` and returns the state it
/// left. Returns `None` if the project was in neither.
pub fn release_state(
    states: &StateStore,
    code: &str,
) -> Result<Option<SendReceiveState>, Box<dyn std::error::Error>> {
    let mut state = states.load(code);
    let previous = state.sr_state;
    if !matches!(previous, SendReceiveState::Hold | SendReceiveState::Error) {
        return Ok(None);
    }
    state.release();
    states.save(&state)?;
    Ok(Some(previous))
}

fn print_state(state: &ProcessingState) {
    println!("Project:        {}", state.project_code);
    println!("State:          {}", state.sr_state);
    println!("Last change:    {}", state.last_state_change.to_rfc3339());
    if let Some(started) = state.start_timestamp {
        println!("Cycle started:  {}", started.to_rfc3339());
    }
    println!(
        "Progress:       {}% (step {}/{})",
        state.percent_complete, state.current_step, state.total_steps
    );
    println!(
        "Elapsed:        {}s, {}s remaining",
        state.elapsed_time_seconds, state.time_remaining_seconds
    );
    println!("Previous run:   {}ms", state.previous_run_total_millis);
    println!("Retries:        {}", state.retry_counter);
    if let Some(code) = state.error_code {
        println!("Error code:     {code}");
    }
    if let Some(message) = &state.error_message {
        println!("Error:          {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexisync_engine::ErrorCode;
    use tempfile::tempdir;

    #[test]
    fn release_held_project() {
        let temp = tempdir().unwrap();
        let states = StateStore::new(SyncConfig::new(temp.path()));
        let mut state = ProcessingState::new("proja");
        state.hold("push rejected", true);
        states.save(&state).unwrap();

        let previous = release_state(&states, "proja").unwrap();
        assert_eq!(previous, Some(SendReceiveState::Hold));

        let released = states.load("proja");
        assert_eq!(released.sr_state, SendReceiveState::Idle);
        assert_eq!(released.error_message, None);
        assert_eq!(released.retry_counter, 1);
    }

    #[test]
    fn release_failed_project() {
        let temp = tempdir().unwrap();
        let states = StateStore::new(SyncConfig::new(temp.path()));
        let mut state = ProcessingState::new("projb");
        state.set_error(ErrorCode::EmptyProject, "empty");
        states.save(&state).unwrap();

        assert_eq!(
            release_state(&states, "projb").unwrap(),
            Some(SendReceiveState::Error)
        );
        assert_eq!(states.load("projb").error_code, None);
    }

    #[test]
    fn release_ignores_other_states() {
        let temp = tempdir().unwrap();
        let states = StateStore::new(SyncConfig::new(temp.path()));
        assert_eq!(release_state(&states, "projc").unwrap(), None);
        assert!(!temp.path().join("state").join("projc.state").exists());
    }
}
