use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use crate::record::{WorkloadHistoryRecord, HISTORY_SCHEMA_VERSION};

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // One record per line, written as a single buffer in append mode so two
    // concurrent CLI invocations cannot interleave partial records.
    pub fn append(&self, record: &WorkloadHistoryRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut line =
            serde_json::to_string(record).context("failed serializing history record")?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open history log: {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("failed to append history log: {}", self.path.display()))?;
        file.flush()
            .with_context(|| format!("failed to flush history log: {}", self.path.display()))?;
        Ok(())
    }

    // Unknown or malformed records are reported through the flag rather than
    // an error; a newer CLI's log must still render on an older reader.
    pub fn read(&self) -> Result<(Vec<WorkloadHistoryRecord>, bool)> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok((Vec::new(), false)),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read history log: {}", self.path.display())
                });
            }
        };

        let mut records = Vec::new();
        let mut unknown_records = false;
        for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
                unknown_records = true;
                continue;
            };
            if value.get("version").and_then(serde_json::Value::as_u64)
                != Some(u64::from(HISTORY_SCHEMA_VERSION))
            {
                unknown_records = true;
                continue;
            }
            match serde_json::from_value::<WorkloadHistoryRecord>(value) {
                Ok(record) => records.push(record),
                Err(_) => unknown_records = true,
            }
        }

        records.sort_by_key(|record| record.time_started_unix_ms);
        Ok((records, unknown_records))
    }
}

pub fn current_unix_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
