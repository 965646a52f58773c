//! First stage: the blended engine score, unaware of any earlier mapping.

use crate::config::SimilarityWeights;
use crate::differ::similarity::SimilarityEngine;
use crate::differ::{Differ, DifferStage};
use crate::model::api::{Api, ApiElement};

pub struct NaiveDiffer<'a> {
    old: &'a Api,
    new: &'a Api,
    engine: SimilarityEngine,
}

impl<'a> NaiveDiffer<'a> {
    pub fn new(old: &'a Api, new: &'a Api) -> Self {
        Self::with_weights(old, new, SimilarityWeights::default())
    }

    pub fn with_weights(old: &'a Api, new: &'a Api, weights: SimilarityWeights) -> Self {
        Self {
            old,
            new,
            engine: SimilarityEngine::new(weights),
        }
    }

    pub fn old(&self) -> &'a Api {
        self.old
    }

    pub fn new_api(&self) -> &'a Api {
        self.new
    }
}

impl Differ for NaiveDiffer<'_> {
    fn stage(&self) -> DifferStage {
        DifferStage::Naive
    }

    fn similarity(&self, x: ApiElement<'_>, y: ApiElement<'_>) -> f64 {
        self.engine.similarity(self.old, x, self.new, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::fixtures::api_with_classes;

    #[test]
    fn test_naive_identity_scores_one() {
        let api = api_with_classes("1", &[("Test", "This is a test")]);
        let differ = NaiveDiffer::new(&api, &api);
        let class = api.element("test/test/Test").unwrap();
        assert_eq!(differ.similarity(class, class), 1.0);
        assert_eq!(differ.stage(), DifferStage::Naive);
    }
}
