use std::collections::BTreeMap;

use semver::Version;
use workband_core::PackKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPack {
    pub id: String,
    pub version: Version,
    pub kind: PackKind,
    pub manifest_id: String,
    pub paths: BTreeMap<String, String>,
}

impl ResolvedPack {
    pub fn path_for_rid(&self, rid: &str) -> Option<&str> {
        self.paths.get(rid).map(String::as_str)
    }
}

pub type PackSet = BTreeMap<String, ResolvedPack>;
