//! Correspondences between the elements of two API snapshots.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ApiDriftError, ApiDriftResult};
use crate::model::api::{Api, ElementKind};

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Multiplicity::OneToOne => "1:1",
            Multiplicity::OneToMany => "1:n",
            Multiplicity::ManyToOne => "n:1",
            Multiplicity::ManyToMany => "n:m",
        };
        f.write_str(label)
    }
}

/// A resolved correspondence between elements of the same kind.
///
/// Identities only; the elements themselves stay in their snapshots.
/// `OneToMany` targets are ordered by descending similarity to the source,
/// every other side is ordered by identity.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapping {
    OneToOne {
        kind: ElementKind,
        source: String,
        target: String,
        similarity: f64,
    },
    OneToMany {
        kind: ElementKind,
        source: String,
        targets: Vec<String>,
        similarity: f64,
    },
    ManyToOne {
        kind: ElementKind,
        sources: Vec<String>,
        target: String,
        similarity: f64,
    },
    ManyToMany {
        kind: ElementKind,
        sources: Vec<String>,
        targets: Vec<String>,
        similarity: f64,
    },
}

impl Mapping {
    /// Build the variant matching the side sizes. Both sides must be non-empty.
    pub fn from_component(
        kind: ElementKind,
        mut sources: Vec<String>,
        mut targets: Vec<String>,
        similarity: f64,
    ) -> Option<Mapping> {
        match (sources.len(), targets.len()) {
            (0, _) | (_, 0) => None,
            (1, 1) => Some(Mapping::OneToOne {
                kind,
                source: sources.remove(0),
                target: targets.remove(0),
                similarity,
            }),
            (1, _) => Some(Mapping::OneToMany {
                kind,
                source: sources.remove(0),
                targets,
                similarity,
            }),
            (_, 1) => Some(Mapping::ManyToOne {
                kind,
                sources,
                target: targets.remove(0),
                similarity,
            }),
            _ => Some(Mapping::ManyToMany {
                kind,
                sources,
                targets,
                similarity,
            }),
        }
    }

    pub fn multiplicity(&self) -> Multiplicity {
        match self {
            Mapping::OneToOne { .. } => Multiplicity::OneToOne,
            Mapping::OneToMany { .. } => Multiplicity::OneToMany,
            Mapping::ManyToOne { .. } => Multiplicity::ManyToOne,
            Mapping::ManyToMany { .. } => Multiplicity::ManyToMany,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Mapping::OneToOne { kind, .. }
            | Mapping::OneToMany { kind, .. }
            | Mapping::ManyToOne { kind, .. }
            | Mapping::ManyToMany { kind, .. } => *kind,
        }
    }

    pub fn similarity(&self) -> f64 {
        match self {
            Mapping::OneToOne { similarity, .. }
            | Mapping::OneToMany { similarity, .. }
            | Mapping::ManyToOne { similarity, .. }
            | Mapping::ManyToMany { similarity, .. } => *similarity,
        }
    }

    pub fn sources(&self) -> Vec<&str> {
        match self {
            Mapping::OneToOne { source, .. } | Mapping::OneToMany { source, .. } => {
                vec![source.as_str()]
            }
            Mapping::ManyToOne { sources, .. } | Mapping::ManyToMany { sources, .. } => {
                sources.iter().map(String::as_str).collect()
            }
        }
    }

    pub fn targets(&self) -> Vec<&str> {
        match self {
            Mapping::OneToOne { target, .. } | Mapping::ManyToOne { target, .. } => {
                vec![target.as_str()]
            }
            Mapping::OneToMany { targets, .. } | Mapping::ManyToMany { targets, .. } => {
                targets.iter().map(String::as_str).collect()
            }
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] -> [{}] ({:.3})",
            self.multiplicity(),
            self.kind(),
            self.sources().join(", "),
            self.targets().join(", "),
            self.similarity()
        )
    }
}

// ---------------------------------------------------------------------------
// MappingSet
// ---------------------------------------------------------------------------

/// All mappings of one comparison, indexed by source and target identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingSet {
    mappings: Vec<Mapping>,
    by_source: BTreeMap<String, usize>,
    by_target: BTreeMap<String, usize>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapping. Overlap with an existing mapping is an invariant
    /// violation and is rejected.
    pub fn push(&mut self, mapping: Mapping) -> ApiDriftResult<()> {
        for source in mapping.sources() {
            if self.by_source.contains_key(source) {
                return Err(ApiDriftError::Inconsistent(format!(
                    "source {source} appears in more than one mapping"
                )));
            }
        }
        for target in mapping.targets() {
            if self.by_target.contains_key(target) {
                return Err(ApiDriftError::Inconsistent(format!(
                    "target {target} appears in more than one mapping"
                )));
            }
        }
        let index = self.mappings.len();
        for source in mapping.sources() {
            self.by_source.insert(source.to_string(), index);
        }
        for target in mapping.targets() {
            self.by_target.insert(target.to_string(), index);
        }
        self.mappings.push(mapping);
        Ok(())
    }

    pub fn extend(&mut self, mappings: impl IntoIterator<Item = Mapping>) -> ApiDriftResult<()> {
        for mapping in mappings {
            self.push(mapping)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.iter()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn of_kind(&self, kind: ElementKind) -> impl Iterator<Item = &Mapping> {
        self.mappings.iter().filter(move |m| m.kind() == kind)
    }

    pub fn mapping_for_source(&self, id: &str) -> Option<&Mapping> {
        self.by_source.get(id).map(|&i| &self.mappings[i])
    }

    pub fn mapping_for_target(&self, id: &str) -> Option<&Mapping> {
        self.by_target.get(id).map(|&i| &self.mappings[i])
    }

    /// Whether `source` and `target` end up in the same mapping.
    pub fn maps(&self, source: &str, target: &str) -> bool {
        match (self.by_source.get(source), self.by_target.get(target)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn count_by_multiplicity(&self, multiplicity: Multiplicity) -> usize {
        self.mappings
            .iter()
            .filter(|m| m.multiplicity() == multiplicity)
            .count()
    }

    /// Old identities that are part of no mapping, in declaration order.
    pub fn removed<'a>(&self, old: &'a Api) -> Vec<&'a str> {
        ElementKind::ALL
            .into_iter()
            .flat_map(|kind| old.elements(kind))
            .map(|e| e.id())
            .filter(|id| !self.by_source.contains_key(*id))
            .collect()
    }

    /// New identities that are part of no mapping, in declaration order.
    pub fn added<'a>(&self, new: &'a Api) -> Vec<&'a str> {
        ElementKind::ALL
            .into_iter()
            .flat_map(|kind| new.elements(kind))
            .map(|e| e.id())
            .filter(|id| !self.by_target.contains_key(*id))
            .collect()
    }

    /// Check that every identity resolves, with the mapping's kind, in the
    /// snapshot of its side. The partition property is upheld by `push`.
    pub fn validate(&self, old: &Api, new: &Api) -> ApiDriftResult<()> {
        for mapping in &self.mappings {
            check_members(mapping.kind(), &mapping.sources(), old, "source")?;
            check_members(mapping.kind(), &mapping.targets(), new, "target")?;
        }
        Ok(())
    }

    /// Every target resolves in `new` to an element of the mapping's kind.
    pub fn validate_targets(&self, new: &Api) -> ApiDriftResult<()> {
        for mapping in &self.mappings {
            check_members(mapping.kind(), &mapping.targets(), new, "target")?;
        }
        Ok(())
    }

    /// Distinct identities on the source side, sorted.
    pub fn source_ids(&self) -> BTreeSet<&str> {
        self.by_source.keys().map(String::as_str).collect()
    }
}

fn check_members(kind: ElementKind, ids: &[&str], api: &Api, role: &str) -> ApiDriftResult<()> {
    for id in ids {
        match api.element(id) {
            Some(e) if e.kind() == kind => {}
            Some(e) => {
                return Err(ApiDriftError::Inconsistent(format!(
                    "{role} {id} is a {} but the mapping is over {kind}",
                    e.kind()
                )))
            }
            None => {
                return Err(ApiDriftError::Inconsistent(format!(
                    "{role} {id} is not part of {} {}",
                    api.distribution, api.version
                )))
            }
        }
    }
    Ok(())
}

impl<'a> IntoIterator for &'a MappingSet {
    type Item = &'a Mapping;
    type IntoIter = std::slice::Iter<'a, Mapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
