use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use workband_core::FeatureBand;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifests_dir(&self) -> PathBuf {
        self.root.join("manifests")
    }

    pub fn band_manifests_dir(&self, feature_band: FeatureBand) -> PathBuf {
        self.manifests_dir().join(feature_band.to_string())
    }

    pub fn manifest_dir(&self, feature_band: FeatureBand, manifest_id: &str) -> PathBuf {
        self.band_manifests_dir(feature_band).join(manifest_id)
    }

    pub fn manifest_path(&self, feature_band: FeatureBand, manifest_id: &str) -> PathBuf {
        self.manifest_dir(feature_band, manifest_id).join("manifest.toml")
    }

    pub fn manifest_installed_marker_path(
        &self,
        feature_band: FeatureBand,
        manifest_id: &str,
    ) -> PathBuf {
        self.manifest_dir(feature_band, manifest_id).join(".installed")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }

    pub fn band_state_dir(&self, feature_band: FeatureBand) -> PathBuf {
        self.state_dir().join(feature_band.to_string())
    }

    pub fn installed_workloads_path(&self, feature_band: FeatureBand) -> PathBuf {
        self.band_state_dir(feature_band)
            .join("installed-workloads.toml")
    }

    pub fn history_log_path(&self, feature_band: FeatureBand) -> PathBuf {
        self.band_state_dir(feature_band).join("history.jsonl")
    }

    pub fn workload_set_path(&self, feature_band: FeatureBand) -> PathBuf {
        self.band_state_dir(feature_band).join("workload-set")
    }

    pub fn ensure_base_dirs(&self, feature_band: FeatureBand) -> Result<()> {
        for dir in [
            self.band_manifests_dir(feature_band),
            self.band_state_dir(feature_band),
        ] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

pub fn default_dotnet_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var("DOTNET_ROOT") {
        if !root.is_empty() {
            return Ok(PathBuf::from(root));
        }
    }

    if cfg!(windows) {
        let app_data = std::env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows dotnet root")?;
        return Ok(PathBuf::from(app_data).join("dotnet"));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve dotnet root")?;
    Ok(PathBuf::from(home).join(".dotnet"))
}
