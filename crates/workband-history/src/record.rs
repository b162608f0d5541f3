use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const HISTORY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadHistoryState {
    #[serde(default)]
    pub manifest_versions: BTreeMap<String, String>,
    #[serde(default)]
    pub installed_workloads: Vec<String>,
    #[serde(default)]
    pub workload_set_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadHistoryRecord {
    pub version: u32,
    pub time_started_unix_ms: u64,
    pub time_completed_unix_ms: u64,
    pub command_line: Vec<String>,
    pub state_before: WorkloadHistoryState,
    pub state_after: WorkloadHistoryState,
    pub succeeded: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}
