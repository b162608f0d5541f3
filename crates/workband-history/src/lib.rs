mod log;
mod record;
mod recorder;

pub use log::{current_unix_timestamp_ms, HistoryLog};
pub use record::{WorkloadHistoryRecord, WorkloadHistoryState, HISTORY_SCHEMA_VERSION};
pub use recorder::WorkloadHistoryRecorder;
