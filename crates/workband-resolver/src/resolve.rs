use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use workband_core::{FeatureBand, PackDefinition, WorkloadDefinition, WorkloadManifest};

use crate::error::ResolutionError;
use crate::types::{PackSet, ResolvedPack};

#[derive(Debug, Clone)]
struct IndexedPack {
    manifest_id: String,
    manifest_overrides: bool,
    definition: PackDefinition,
}

#[derive(Debug, Clone)]
struct IndexedWorkload {
    manifest_id: String,
    manifest_overrides: bool,
    definition: WorkloadDefinition,
}

enum DuplicateOutcome {
    KeepExisting,
    ReplaceWithIncoming,
    Conflict,
}

// Duplicate declarations across manifests resolve only through the explicit
// override marker; identical claims deduplicate and everything else is a
// conflict. Implicit newest-wins is deliberately not a rule here.
fn judge_duplicate(
    definitions_equal: bool,
    existing_overrides: bool,
    incoming_overrides: bool,
) -> DuplicateOutcome {
    if definitions_equal {
        return DuplicateOutcome::KeepExisting;
    }
    match (existing_overrides, incoming_overrides) {
        (true, false) => DuplicateOutcome::KeepExisting,
        (false, true) => DuplicateOutcome::ReplaceWithIncoming,
        _ => DuplicateOutcome::Conflict,
    }
}

#[derive(Debug, Clone)]
pub struct WorkloadResolver {
    feature_band: FeatureBand,
    workloads: BTreeMap<String, IndexedWorkload>,
    packs: BTreeMap<String, IndexedPack>,
}

impl WorkloadResolver {
    pub fn new(
        feature_band: FeatureBand,
        manifests: &[WorkloadManifest],
    ) -> Result<Self, ResolutionError> {
        // Index in manifest-id order so duplicate handling never depends on
        // the order the provider happened to yield manifests in.
        let mut ordered: Vec<&WorkloadManifest> = manifests.iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));

        let mut workloads: BTreeMap<String, IndexedWorkload> = BTreeMap::new();
        let mut packs: BTreeMap<String, IndexedPack> = BTreeMap::new();

        for manifest in ordered {
            if manifest.feature_band != feature_band {
                return Err(ResolutionError::ForeignBand {
                    manifest_id: manifest.id.clone(),
                    expected: feature_band,
                    actual: manifest.feature_band,
                });
            }

            for (workload_id, definition) in &manifest.workloads {
                let incoming = IndexedWorkload {
                    manifest_id: manifest.id.clone(),
                    manifest_overrides: manifest.overrides,
                    definition: definition.clone(),
                };
                match workloads.entry(workload_id.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(incoming);
                    }
                    Entry::Occupied(mut slot) => {
                        let existing = slot.get();
                        match judge_duplicate(
                            existing.definition == incoming.definition,
                            existing.manifest_overrides,
                            incoming.manifest_overrides,
                        ) {
                            DuplicateOutcome::KeepExisting => {}
                            DuplicateOutcome::ReplaceWithIncoming => {
                                slot.insert(incoming);
                            }
                            DuplicateOutcome::Conflict => {
                                return Err(ResolutionError::WorkloadConflict {
                                    workload_id: workload_id.clone(),
                                    feature_band,
                                    first_manifest: existing.manifest_id.clone(),
                                    second_manifest: manifest.id.clone(),
                                });
                            }
                        }
                    }
                }
            }

            for (pack_id, definition) in &manifest.packs {
                let incoming = IndexedPack {
                    manifest_id: manifest.id.clone(),
                    manifest_overrides: manifest.overrides,
                    definition: definition.clone(),
                };
                match packs.entry(pack_id.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(incoming);
                    }
                    Entry::Occupied(mut slot) => {
                        let existing = slot.get();
                        match judge_duplicate(
                            existing.definition == incoming.definition,
                            existing.manifest_overrides,
                            incoming.manifest_overrides,
                        ) {
                            DuplicateOutcome::KeepExisting => {}
                            DuplicateOutcome::ReplaceWithIncoming => {
                                slot.insert(incoming);
                            }
                            DuplicateOutcome::Conflict => {
                                return Err(ResolutionError::PackConflict {
                                    pack_id: pack_id.clone(),
                                    feature_band,
                                    first_manifest: existing.manifest_id.clone(),
                                    first_version: existing.definition.version.clone(),
                                    second_manifest: manifest.id.clone(),
                                    second_version: definition.version.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }

        Ok(Self {
            feature_band,
            workloads,
            packs,
        })
    }

    pub fn feature_band(&self) -> FeatureBand {
        self.feature_band
    }

    pub fn workload_ids(&self) -> impl Iterator<Item = &str> {
        self.workloads.keys().map(String::as_str)
    }

    pub fn resolve<I, S>(&self, workload_ids: I) -> Result<PackSet, ResolutionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = PackSet::new();
        let mut expanded: BTreeSet<String> = BTreeSet::new();

        for workload_id in workload_ids {
            let workload_id = workload_id.as_ref();
            let entry = self.workloads.get(workload_id).ok_or_else(|| {
                ResolutionError::UnknownWorkload {
                    workload_id: workload_id.to_string(),
                    feature_band: self.feature_band,
                }
            })?;
            if entry.definition.is_abstract {
                return Err(ResolutionError::AbstractWorkload {
                    workload_id: workload_id.to_string(),
                });
            }
            let mut chain = Vec::new();
            self.expand(workload_id, &mut chain, &mut expanded, &mut resolved)?;
        }

        Ok(resolved)
    }

    fn expand(
        &self,
        workload_id: &str,
        chain: &mut Vec<String>,
        expanded: &mut BTreeSet<String>,
        resolved: &mut PackSet,
    ) -> Result<(), ResolutionError> {
        if chain.iter().any(|seen| seen == workload_id) {
            let mut cycle = chain.clone();
            cycle.push(workload_id.to_string());
            return Err(ResolutionError::CyclicWorkload { chain: cycle });
        }
        if expanded.contains(workload_id) {
            return Ok(());
        }

        let entry = self.workloads.get(workload_id).ok_or_else(|| {
            ResolutionError::UnknownWorkload {
                workload_id: workload_id.to_string(),
                feature_band: self.feature_band,
            }
        })?;

        chain.push(workload_id.to_string());
        for pack_id in &entry.definition.packs {
            let pack =
                self.packs
                    .get(pack_id)
                    .ok_or_else(|| ResolutionError::MissingPack {
                        workload_id: workload_id.to_string(),
                        pack_id: pack_id.clone(),
                        feature_band: self.feature_band,
                    })?;
            resolved.insert(
                pack_id.clone(),
                ResolvedPack {
                    id: pack_id.clone(),
                    version: pack.definition.version.clone(),
                    kind: pack.definition.kind,
                    manifest_id: pack.manifest_id.clone(),
                    paths: pack.definition.paths.clone(),
                },
            );
        }
        for parent in &entry.definition.extends {
            self.expand(parent, chain, expanded, resolved)?;
        }
        chain.pop();
        expanded.insert(workload_id.to_string());

        Ok(())
    }
}
