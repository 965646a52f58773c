//! Turns a differ's pairwise scores into mappings.
//!
//! For each element kind: score every (old, new) candidate pair, keep the
//! edges at or above the threshold, and emit one mapping per connected
//! component of the resulting bipartite graph.

use std::collections::BTreeMap;

use tracing::debug;

use crate::differ::Differ;
use crate::errors::ApiDriftResult;
use crate::model::api::{Api, ApiElement, ElementKind};
use crate::model::mapping::{Mapping, MappingSet};

// ---------------------------------------------------------------------------
// Union-find
// ---------------------------------------------------------------------------

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = node;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Smaller index wins so roots are stable across runs.
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[high] = low;
        }
    }
}

// ---------------------------------------------------------------------------
// Mapper
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Mapper {
    threshold: f64,
}

impl Mapper {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Map every element kind of `old` onto `new`.
    ///
    /// Classes and functions are compared across the whole snapshot.
    /// Parameters and results are only compared between the functions of one
    /// function mapping, attributes between the classes of one class mapping.
    pub fn map_api(&self, old: &Api, new: &Api, differ: &dyn Differ) -> ApiDriftResult<MappingSet> {
        let mut set = MappingSet::new();

        let classes = self.map_elements(
            differ,
            ElementKind::Class,
            old.elements(ElementKind::Class),
            new.elements(ElementKind::Class),
        );
        let functions = self.map_elements(
            differ,
            ElementKind::Function,
            old.elements(ElementKind::Function),
            new.elements(ElementKind::Function),
        );

        let parameters = self.map_children(old, new, differ, &functions, ElementKind::Parameter);
        let attributes = self.map_children(old, new, differ, &classes, ElementKind::Attribute);
        let results = self.map_children(old, new, differ, &functions, ElementKind::Result);

        set.extend(classes)?;
        set.extend(functions)?;
        set.extend(parameters)?;
        set.extend(attributes)?;
        set.extend(results)?;

        debug!(
            "mapped {} -> {} with {} mappings",
            old.version,
            new.version,
            set.len()
        );
        Ok(set)
    }

    fn map_children(
        &self,
        old: &Api,
        new: &Api,
        differ: &dyn Differ,
        containers: &[Mapping],
        kind: ElementKind,
    ) -> Vec<Mapping> {
        let mut mappings = Vec::new();
        for container in containers {
            let sources: Vec<ApiElement<'_>> = container
                .sources()
                .into_iter()
                .flat_map(|id| old.children(id, kind))
                .filter_map(|id| old.element(id))
                .collect();
            let targets: Vec<ApiElement<'_>> = container
                .targets()
                .into_iter()
                .flat_map(|id| new.children(id, kind))
                .filter_map(|id| new.element(id))
                .collect();
            mappings.extend(self.map_elements(differ, kind, sources, targets));
        }
        sort_mappings(&mut mappings);
        mappings
    }

    /// Connected components of the above-threshold graph between `sources`
    /// and `targets`, one mapping each.
    pub fn map_elements(
        &self,
        differ: &dyn Differ,
        kind: ElementKind,
        mut sources: Vec<ApiElement<'_>>,
        mut targets: Vec<ApiElement<'_>>,
    ) -> Vec<Mapping> {
        sources.sort_by(|a, b| a.id().cmp(b.id()));
        sources.dedup_by(|a, b| a.id() == b.id());
        targets.sort_by(|a, b| a.id().cmp(b.id()));
        targets.dedup_by(|a, b| a.id() == b.id());

        let offset = sources.len();
        let mut components = DisjointSet::new(sources.len() + targets.len());
        let mut edges: Vec<(usize, usize, f64)> = Vec::new();
        for (i, x) in sources.iter().enumerate() {
            for (j, y) in targets.iter().enumerate() {
                let score = differ.similarity(*x, *y);
                // A zero score is a rejection, never a candidate.
                if score > 0.0 && score >= self.threshold {
                    edges.push((i, j, score));
                    components.union(i, offset + j);
                }
            }
        }

        let mut groups: BTreeMap<usize, (Vec<usize>, Vec<usize>, f64)> = BTreeMap::new();
        for &(i, j, score) in &edges {
            let root = components.find(i);
            let group = groups.entry(root).or_insert_with(|| (Vec::new(), Vec::new(), 0.0));
            if !group.0.contains(&i) {
                group.0.push(i);
            }
            if !group.1.contains(&j) {
                group.1.push(j);
            }
            group.2 = group.2.max(score);
        }

        let mut mappings = Vec::with_capacity(groups.len());
        for (mut source_idx, mut target_idx, similarity) in groups.into_values() {
            source_idx.sort_unstable();
            target_idx.sort_unstable();
            if source_idx.len() == 1 && target_idx.len() > 1 {
                let source = source_idx[0];
                let score_of = |j: usize| {
                    edges
                        .iter()
                        .find(|&&(i, t, _)| i == source && t == j)
                        .map_or(0.0, |&(_, _, s)| s)
                };
                // Descending similarity, identity order on ties.
                target_idx.sort_by(|&a, &b| score_of(b).total_cmp(&score_of(a)).then(a.cmp(&b)));
            }
            let source_ids = source_idx.iter().map(|&i| sources[i].id().to_string()).collect();
            let target_ids = target_idx.iter().map(|&j| targets[j].id().to_string()).collect();
            if let Some(mapping) = Mapping::from_component(kind, source_ids, target_ids, similarity) {
                mappings.push(mapping);
            }
        }
        sort_mappings(&mut mappings);
        mappings
    }
}

/// Order by first source identity, then smallest target identity.
fn sort_mappings(mappings: &mut [Mapping]) {
    mappings.sort_by(|a, b| {
        let key = |m: &Mapping| {
            let first_source = m.sources().first().map(|s| s.to_string()).unwrap_or_default();
            let first_target = m.targets().into_iter().min().map(str::to_string).unwrap_or_default();
            (first_source, first_target)
        };
        key(a).cmp(&key(b))
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
