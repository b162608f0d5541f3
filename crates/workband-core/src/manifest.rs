use std::collections::BTreeMap;

use anyhow::{anyhow, Context};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::band::FeatureBand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackKind {
    Sdk,
    Template,
    Library,
    Tool,
}

impl PackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sdk => "sdk",
            Self::Template => "template",
            Self::Library => "library",
            Self::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackDefinition {
    pub version: Version,
    pub kind: PackKind,
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
}

impl PackDefinition {
    pub fn path_for_rid(&self, rid: &str) -> Option<&str> {
        self.paths.get(rid).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkloadDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    // Abstract workloads exist only to be extended; they cannot be requested
    // or recorded as installed themselves.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub packs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkloadManifest {
    pub id: String,
    pub version: Version,
    pub feature_band: FeatureBand,
    #[serde(default)]
    pub overrides: bool,
    #[serde(default)]
    pub workloads: BTreeMap<String, WorkloadDefinition>,
    #[serde(default)]
    pub packs: BTreeMap<String, PackDefinition>,
}

impl WorkloadManifest {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let manifest: Self = toml::from_str(input).context("failed to parse workload manifest")?;
        if manifest.id.trim().is_empty() {
            return Err(anyhow!("workload manifest id must not be empty"));
        }

        for (workload_id, definition) in &manifest.workloads {
            if workload_id.trim().is_empty() {
                return Err(anyhow!(
                    "manifest '{}' declares a workload with an empty id",
                    manifest.id
                ));
            }
            if definition.extends.iter().any(|parent| parent == workload_id) {
                return Err(anyhow!(
                    "workload '{workload_id}' in manifest '{}' extends itself",
                    manifest.id
                ));
            }
            for parent in &definition.extends {
                if parent.trim().is_empty() {
                    return Err(anyhow!(
                        "workload '{workload_id}' in manifest '{}' has an empty extends target",
                        manifest.id
                    ));
                }
            }
            for pack_id in &definition.packs {
                if pack_id.trim().is_empty() {
                    return Err(anyhow!(
                        "workload '{workload_id}' in manifest '{}' has an empty pack reference",
                        manifest.id
                    ));
                }
            }
        }

        for pack_id in manifest.packs.keys() {
            if pack_id.trim().is_empty() {
                return Err(anyhow!(
                    "manifest '{}' declares a pack with an empty id",
                    manifest.id
                ));
            }
        }

        Ok(manifest)
    }
}
