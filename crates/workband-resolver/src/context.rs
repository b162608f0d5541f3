use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use semver::Version;
use workband_core::{FeatureBand, WorkloadManifest};

use crate::resolve::WorkloadResolver;
use crate::types::PackSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolverScope {
    pub feature_band: FeatureBand,
    pub dotnet_root: PathBuf,
    pub sdk_version: Version,
}

impl ResolverScope {
    pub fn new(dotnet_root: impl Into<PathBuf>, sdk_version: Version) -> Self {
        let feature_band = FeatureBand::from_sdk_version(&sdk_version);
        Self {
            feature_band,
            dotnet_root: dotnet_root.into(),
            sdk_version,
        }
    }
}

// Per-invocation resolution cache. Constructed by the caller and threaded
// explicitly; a new process starts from an empty context, so nothing here
// ever needs invalidation.
#[derive(Debug, Default)]
pub struct ResolverContext {
    resolvers: HashMap<ResolverScope, WorkloadResolver>,
    results: HashMap<(ResolverScope, Vec<String>), PackSet>,
}

impl ResolverContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolver<F>(&mut self, scope: &ResolverScope, load_manifests: F) -> Result<&WorkloadResolver>
    where
        F: FnOnce() -> Result<Vec<WorkloadManifest>>,
    {
        if !self.resolvers.contains_key(scope) {
            let manifests = load_manifests().with_context(|| {
                format!(
                    "failed loading manifests for feature band {}",
                    scope.feature_band
                )
            })?;
            let resolver = WorkloadResolver::new(scope.feature_band, &manifests)?;
            self.resolvers.insert(scope.clone(), resolver);
        }
        Ok(&self.resolvers[scope])
    }

    pub fn resolve<F>(
        &mut self,
        scope: &ResolverScope,
        workload_ids: &[String],
        load_manifests: F,
    ) -> Result<PackSet>
    where
        F: FnOnce() -> Result<Vec<WorkloadManifest>>,
    {
        let mut normalized = workload_ids.to_vec();
        normalized.sort();
        normalized.dedup();

        let key = (scope.clone(), normalized);
        if let Some(cached) = self.results.get(&key) {
            return Ok(cached.clone());
        }

        let packs = self.resolver(scope, load_manifests)?.resolve(&key.1)?;
        self.results.insert(key, packs.clone());
        Ok(packs)
    }
}
