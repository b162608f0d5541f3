use semver::Version;
use workband_core::FeatureBand;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("pack '{pack_id}' is declared as {first_version} by manifest '{first_manifest}' and as {second_version} by manifest '{second_manifest}' in feature band {feature_band}")]
    PackConflict {
        pack_id: String,
        feature_band: FeatureBand,
        first_manifest: String,
        first_version: Version,
        second_manifest: String,
        second_version: Version,
    },
    #[error("workload '{workload_id}' is declared by both manifest '{first_manifest}' and manifest '{second_manifest}' in feature band {feature_band}")]
    WorkloadConflict {
        workload_id: String,
        feature_band: FeatureBand,
        first_manifest: String,
        second_manifest: String,
    },
    #[error("unknown workload id '{workload_id}' in feature band {feature_band}")]
    UnknownWorkload {
        workload_id: String,
        feature_band: FeatureBand,
    },
    #[error("workload '{workload_id}' is abstract and cannot be requested directly")]
    AbstractWorkload { workload_id: String },
    #[error("workload '{workload_id}' requires pack '{pack_id}' which no manifest in feature band {feature_band} defines")]
    MissingPack {
        workload_id: String,
        pack_id: String,
        feature_band: FeatureBand,
    },
    #[error("cyclic workload definition: {}", .chain.join(" -> "))]
    CyclicWorkload { chain: Vec<String> },
    #[error("manifest '{manifest_id}' belongs to feature band {actual}, not {expected}")]
    ForeignBand {
        manifest_id: String,
        expected: FeatureBand,
        actual: FeatureBand,
    },
}
