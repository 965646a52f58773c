//! Diagnostic mapping report: what was matched, split, merged, added and
//! removed between two snapshots.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ApiDriftResult;
use crate::model::api::{Api, ElementKind};
use crate::model::mapping::{MappingSet, Multiplicity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub distribution: String,
    pub package: String,
    pub version: String,
}

impl SnapshotHeader {
    fn of(api: &Api) -> Self {
        Self {
            distribution: api.distribution.clone(),
            package: api.package.clone(),
            version: api.version.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub multiplicity: Multiplicity,
    pub kind: ElementKind,
    pub sources: Vec<String>,
    pub targets: Vec<String>,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingReport {
    pub old: SnapshotHeader,
    pub new: SnapshotHeader,
    pub mappings: Vec<MappingRecord>,
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

impl MappingReport {
    pub fn new(old: &Api, new: &Api, mappings: &MappingSet) -> Self {
        Self {
            old: SnapshotHeader::of(old),
            new: SnapshotHeader::of(new),
            mappings: mappings
                .iter()
                .map(|m| MappingRecord {
                    multiplicity: m.multiplicity(),
                    kind: m.kind(),
                    sources: m.sources().into_iter().map(str::to_string).collect(),
                    targets: m.targets().into_iter().map(str::to_string).collect(),
                    similarity: m.similarity(),
                })
                .collect(),
            removed: mappings.removed(old).into_iter().map(str::to_string).collect(),
            added: mappings.added(new).into_iter().map(str::to_string).collect(),
        }
    }

    pub fn count(&self, multiplicity: Multiplicity) -> usize {
        self.mappings
            .iter()
            .filter(|m| m.multiplicity == multiplicity)
            .count()
    }

    pub fn to_json(&self) -> ApiDriftResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> ApiDriftResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
