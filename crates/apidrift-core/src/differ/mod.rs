//! Differ stages, the mapper, and the pipeline that chains them.
//!
//! Every stage is a similarity function over pairs of elements of the same
//! kind, optionally informed by the mapping the previous stage produced.
//! The [`mapper`] turns a stage's scores into a [`MappingSet`].
//!
//! [`MappingSet`]: crate::model::mapping::MappingSet

pub mod distance;
pub mod inheritance;
pub mod mapper;
pub mod naive;
pub mod pipeline;
pub mod similarity;
pub mod strict;
pub mod unchanged;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DifferConfig;
use crate::model::api::{Api, ApiElement};
use crate::model::mapping::MappingSet;

pub use inheritance::InheritanceDiffer;
pub use naive::NaiveDiffer;
pub use strict::StrictDiffer;
pub use unchanged::UnchangedDiffer;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferStage {
    Naive,
    Strict,
    Inheritance,
    Unchanged,
}

impl DifferStage {
    /// Pipeline order.
    pub const ALL: [DifferStage; 4] = [
        DifferStage::Naive,
        DifferStage::Strict,
        DifferStage::Inheritance,
        DifferStage::Unchanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifferStage::Naive => "naive",
            DifferStage::Strict => "strict",
            DifferStage::Inheritance => "inheritance",
            DifferStage::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for DifferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A similarity strategy between an old and a new snapshot.
///
/// `x` always comes from the old snapshot and `y` from the new one. Pairs of
/// different kinds score 0.
pub trait Differ {
    fn stage(&self) -> DifferStage;

    fn similarity(&self, x: ApiElement<'_>, y: ApiElement<'_>) -> f64;
}

/// Build the differ for `stage`, fed with the previous stage's mapping.
pub fn build_differ<'a>(
    stage: DifferStage,
    old: &'a Api,
    new: &'a Api,
    previous: Option<&'a MappingSet>,
    config: &DifferConfig,
) -> Box<dyn Differ + 'a> {
    match stage {
        DifferStage::Naive => Box::new(NaiveDiffer::new(old, new)),
        DifferStage::Strict => Box::new(StrictDiffer::new(old, new, previous)),
        DifferStage::Inheritance => Box::new(InheritanceDiffer::new(
            old,
            new,
            previous,
            config.inheritance_boost,
        )),
        DifferStage::Unchanged => Box::new(UnchangedDiffer::new(
            old,
            new,
            previous,
            config.inheritance_boost,
        )),
    }
}
