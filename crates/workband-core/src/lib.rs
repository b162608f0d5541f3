mod band;
mod manifest;

pub use band::FeatureBand;
pub use manifest::{PackDefinition, PackKind, WorkloadDefinition, WorkloadManifest};

#[cfg(test)]
mod tests;
