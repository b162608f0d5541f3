use anyhow::Result;

use crate::log::{current_unix_timestamp_ms, HistoryLog};
use crate::record::{WorkloadHistoryRecord, WorkloadHistoryState, HISTORY_SCHEMA_VERSION};

pub struct WorkloadHistoryRecorder<'a> {
    log: &'a HistoryLog,
    command_line: Vec<String>,
    capture: &'a dyn Fn() -> Result<WorkloadHistoryState>,
}

impl<'a> WorkloadHistoryRecorder<'a> {
    pub fn new(
        log: &'a HistoryLog,
        command_line: Vec<String>,
        capture: &'a dyn Fn() -> Result<WorkloadHistoryState>,
    ) -> Self {
        Self {
            log,
            command_line,
            capture,
        }
    }

    // Exactly one record per invocation, written whether or not the action
    // fails, and the action's own error always propagates unchanged.
    pub fn run<T>(&self, action: impl FnOnce() -> Result<T>) -> Result<T> {
        let time_started_unix_ms = current_unix_timestamp_ms();
        let state_before = self.capture_state("before");

        let outcome = action();

        let record = WorkloadHistoryRecord {
            version: HISTORY_SCHEMA_VERSION,
            time_started_unix_ms,
            time_completed_unix_ms: current_unix_timestamp_ms(),
            command_line: self.command_line.clone(),
            state_before,
            state_after: self.capture_state("after"),
            succeeded: outcome.is_ok(),
            error_message: outcome.as_ref().err().map(|err| format!("{err:#}")),
        };

        // History is diagnostic data; an append failure must never mask the
        // outcome of the command it describes.
        if let Err(append_err) = self.log.append(&record) {
            eprintln!("warning: failed to append workload history record: {append_err:#}");
        }

        outcome
    }

    fn capture_state(&self, phase: &str) -> WorkloadHistoryState {
        match (self.capture)() {
            Ok(state) => state,
            Err(err) => {
                eprintln!("warning: failed capturing workload state {phase} command: {err:#}");
                WorkloadHistoryState::default()
            }
        }
    }
}
