use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use workband_core::FeatureBand;

use crate::layout::StateLayout;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct InstalledWorkloadsFile {
    #[serde(default)]
    workloads: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct InstalledWorkloadStore {
    layout: StateLayout,
}

impl InstalledWorkloadStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    pub fn read(&self, feature_band: FeatureBand) -> Result<Vec<String>> {
        let path = self.layout.installed_workloads_path(feature_band);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed reading installed workload record: {}", path.display())
                });
            }
        };

        let mut state: InstalledWorkloadsFile = toml::from_str(&content).with_context(|| {
            format!("failed parsing installed workload record: {}", path.display())
        })?;
        state.workloads.sort();
        state.workloads.dedup();
        Ok(state.workloads)
    }

    pub fn add(&self, feature_band: FeatureBand, workload_ids: &[String]) -> Result<Vec<String>> {
        for workload_id in workload_ids {
            if workload_id.trim().is_empty() {
                anyhow::bail!("cannot record an empty workload id as installed");
            }
        }

        let mut workloads = self.read(feature_band)?;
        workloads.extend(workload_ids.iter().cloned());
        workloads.sort();
        workloads.dedup();
        self.save(feature_band, &workloads)?;
        Ok(workloads)
    }

    pub fn remove(&self, feature_band: FeatureBand, workload_ids: &[String]) -> Result<Vec<String>> {
        let mut workloads = self.read(feature_band)?;
        for workload_id in workload_ids {
            let before = workloads.len();
            workloads.retain(|installed| installed != workload_id);
            if workloads.len() == before {
                anyhow::bail!(
                    "workload '{}' is not recorded as installed for feature band {}",
                    workload_id,
                    feature_band
                );
            }
        }
        self.save(feature_band, &workloads)?;
        Ok(workloads)
    }

    fn save(&self, feature_band: FeatureBand, workloads: &[String]) -> Result<()> {
        let state = InstalledWorkloadsFile {
            workloads: workloads.to_vec(),
        };
        let content = toml::to_string(&state).with_context(|| {
            format!(
                "failed serializing installed workload record for feature band {feature_band}"
            )
        })?;
        write_atomic(&self.layout.installed_workloads_path(feature_band), &content)
    }
}

pub fn read_workload_set_version(
    layout: &StateLayout,
    feature_band: FeatureBand,
) -> Result<Option<String>> {
    let path = layout.workload_set_path(feature_band);
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err)
            .with_context(|| format!("failed reading workload set version: {}", path.display())),
    }
}

// Stage next to the destination and promote with rename so a concurrent
// reader never observes a partially written record.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("state file path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("state file path has no file name: {}", path.display()))?
        .to_string_lossy();
    let staged = parent.join(format!(".{}.tmp-{}", file_name, unique_suffix()));

    fs::write(&staged, content)
        .with_context(|| format!("failed writing staged state file: {}", staged.display()))?;
    fs::rename(&staged, path).with_context(|| {
        format!(
            "failed promoting staged state file {} to {}",
            staged.display(),
            path.display()
        )
    })
}

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}
