use std::fs;

use anyhow::{Context, Result};
use workband_core::FeatureBand;

use crate::layout::StateLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawManifest {
    pub id: String,
    pub feature_band: FeatureBand,
    pub installed: bool,
    pub content: String,
}

// The seam to whatever delivers manifests (bundled SDK layout, installer
// output, test fixtures). Each call may re-read the source, so callers
// materialize once per logical operation.
pub trait ManifestProvider {
    fn manifests(&self, feature_band: FeatureBand) -> Result<Vec<RawManifest>>;
}

#[derive(Debug, Clone)]
pub struct DirectoryManifestProvider {
    layout: StateLayout,
}

impl DirectoryManifestProvider {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }
}

impl ManifestProvider for DirectoryManifestProvider {
    fn manifests(&self, feature_band: FeatureBand) -> Result<Vec<RawManifest>> {
        let band_dir = self.layout.band_manifests_dir(feature_band);
        if !band_dir.exists() {
            return Ok(Vec::new());
        }

        let mut raw_manifests = Vec::new();
        for entry in fs::read_dir(&band_dir)
            .with_context(|| format!("failed reading manifest directory {}", band_dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().to_string();

            let manifest_path = self.layout.manifest_path(feature_band, &id);
            if !manifest_path.is_file() {
                anyhow::bail!(
                    "manifest directory '{}' is missing manifest.toml: {}",
                    id,
                    manifest_path.display()
                );
            }
            let content = fs::read_to_string(&manifest_path).with_context(|| {
                format!("failed reading manifest file {}", manifest_path.display())
            })?;

            let installed = self
                .layout
                .manifest_installed_marker_path(feature_band, &id)
                .is_file();

            raw_manifests.push(RawManifest {
                id,
                feature_band,
                installed,
                content,
            });
        }

        raw_manifests.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(raw_manifests)
    }
}
