//! Ordered execution of the differ stages.
//!
//! Each stage is a plain function of the two snapshots and the mapping of
//! the stage before it, so any stage can be re-run on its own after an
//! earlier mapping was corrected by hand.

use std::time::Instant;

use tracing::info;

use crate::config::DifferConfig;
use crate::differ::mapper::Mapper;
use crate::differ::{build_differ, DifferStage};
use crate::errors::ApiDriftResult;
use crate::model::api::Api;
use crate::model::mapping::{MappingSet, Multiplicity};

/// Mappings of every stage in pipeline order. The last one is authoritative.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub stages: Vec<(DifferStage, MappingSet)>,
    pub mapping: MappingSet,
}

impl PipelineOutcome {
    pub fn stage(&self, stage: DifferStage) -> Option<&MappingSet> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, mapping)| mapping)
    }
}

/// Run one stage on top of an optional previous mapping.
///
/// The result is validated against both snapshots; a mapping that refers to
/// an unknown identity or to an element of the wrong kind aborts with
/// [`ApiDriftError::Inconsistent`](crate::errors::ApiDriftError::Inconsistent).
pub fn run_stage(
    stage: DifferStage,
    old: &Api,
    new: &Api,
    previous: Option<&MappingSet>,
    config: &DifferConfig,
) -> ApiDriftResult<MappingSet> {
    if let Some(previous) = previous {
        previous.validate(old, new)?;
    }
    let started = Instant::now();
    let differ = build_differ(stage, old, new, previous, config);
    let mapping = Mapper::new(config.similarity_threshold).map_api(old, new, differ.as_ref())?;
    mapping.validate(old, new)?;

    info!(
        "{stage} stage: {} mappings ({} 1:1, {} 1:n, {} n:1, {} n:m) in {:?}",
        mapping.len(),
        mapping.count_by_multiplicity(Multiplicity::OneToOne),
        mapping.count_by_multiplicity(Multiplicity::OneToMany),
        mapping.count_by_multiplicity(Multiplicity::ManyToOne),
        mapping.count_by_multiplicity(Multiplicity::ManyToMany),
        started.elapsed()
    );
    Ok(mapping)
}

/// Run all four stages, each fed with its predecessor's mapping.
pub fn run_pipeline(old: &Api, new: &Api, config: &DifferConfig) -> ApiDriftResult<PipelineOutcome> {
    info!(
        "diffing {} {} ({} elements) against {} {} ({} elements)",
        old.distribution,
        old.version,
        old.element_count(),
        new.distribution,
        new.version,
        new.element_count()
    );
    let mut stages: Vec<(DifferStage, MappingSet)> = Vec::with_capacity(DifferStage::ALL.len());
    for stage in DifferStage::ALL {
        let previous = stages.last().map(|(_, mapping)| mapping);
        let mapping = run_stage(stage, old, new, previous, config)?;
        stages.push((stage, mapping));
    }
    let mapping = stages
        .last()
        .map(|(_, mapping)| mapping.clone())
        .unwrap_or_default();
    Ok(PipelineOutcome { stages, mapping })
}
