use anyhow::{Context, Result};
use workband_core::{FeatureBand, WorkloadManifest};

use crate::provider::{ManifestProvider, RawManifest};

#[derive(Debug, Clone)]
pub struct ManifestStore<P> {
    provider: P,
    feature_band: FeatureBand,
}

impl<P: ManifestProvider> ManifestStore<P> {
    pub fn new(provider: P, feature_band: FeatureBand) -> Self {
        Self {
            provider,
            feature_band,
        }
    }

    pub fn feature_band(&self) -> FeatureBand {
        self.feature_band
    }

    pub fn manifests(&self) -> Result<Vec<WorkloadManifest>> {
        self.parse_manifests(|_| true)
    }

    pub fn installed_manifests(&self) -> Result<Vec<WorkloadManifest>> {
        self.parse_manifests(|raw| raw.installed)
    }

    // A malformed manifest fails the whole load; a silently skipped manifest
    // would let a missing pack definition corrupt resolution downstream.
    fn parse_manifests(&self, keep: impl Fn(&RawManifest) -> bool) -> Result<Vec<WorkloadManifest>> {
        let mut manifests = Vec::new();
        for raw in self.provider.manifests(self.feature_band)? {
            if !keep(&raw) {
                continue;
            }

            let manifest = WorkloadManifest::from_toml_str(&raw.content)
                .with_context(|| format!("malformed workload manifest '{}'", raw.id))?;
            if manifest.id != raw.id {
                anyhow::bail!(
                    "manifest '{}' declares id '{}' which does not match its location",
                    raw.id,
                    manifest.id
                );
            }
            if manifest.feature_band != raw.feature_band {
                anyhow::bail!(
                    "manifest '{}' declares feature band {} but was provided for band {}",
                    raw.id,
                    manifest.feature_band,
                    raw.feature_band
                );
            }
            manifests.push(manifest);
        }
        Ok(manifests)
    }
}
