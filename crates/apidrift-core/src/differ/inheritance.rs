//! Third stage: strict scores, widened along class hierarchies.
//!
//! Two adjustments on top of [`StrictDiffer`]:
//!
//! * a member pair rejected only because its containers disagree with the
//!   previous mapping is accepted again when the new container is an
//!   ancestor or descendant of a class the old container was mapped to
//!   (members moving up or down a hierarchy);
//! * a new member that overrides an ancestor member which the previous
//!   mapping already matched with the old member has its score moved toward
//!   that mapping's similarity by `boost`.

use crate::differ::strict::StrictDiffer;
use crate::differ::{Differ, DifferStage};
use crate::model::api::{Api, ApiElement, ElementKind};
use crate::model::mapping::MappingSet;

pub struct InheritanceDiffer<'a> {
    strict: StrictDiffer<'a>,
    boost: f64,
}

impl<'a> InheritanceDiffer<'a> {
    pub fn new(old: &'a Api, new: &'a Api, previous: Option<&'a MappingSet>, boost: f64) -> Self {
        Self {
            strict: StrictDiffer::new(old, new, previous),
            boost: boost.clamp(0.0, 1.0),
        }
    }

    fn new_api(&self) -> &'a Api {
        self.strict.naive().new_api()
    }

    /// Whether the new container sits in the hierarchy of a class the old
    /// container was mapped to.
    fn related_through_inheritance(&self, x: &ApiElement<'_>, y: &ApiElement<'_>) -> bool {
        let Some(previous) = self.strict.previous() else {
            return false;
        };
        let (Some(old_parent), Some(new_parent)) = self.strict.containers(x, y) else {
            return false;
        };
        let Some(mapping) = previous.mapping_for_source(old_parent) else {
            return false;
        };
        let new = self.new_api();
        mapping.targets().into_iter().any(|target| {
            new.classes.contains_key(target)
                && (new.ancestors(target).contains(new_parent)
                    || new.descendants(target).contains(new_parent))
        })
    }

    /// Containers agree with the previous mapping, directly or through the
    /// class hierarchy.
    pub fn admits(&self, x: &ApiElement<'_>, y: &ApiElement<'_>) -> bool {
        self.strict.containers_consistent(x, y) || self.related_through_inheritance(x, y)
    }

    /// Similarity of the previous mapping between `x` and the ancestor member
    /// that `y` overrides, if there is one.
    fn overridden_similarity(&self, x: &ApiElement<'_>, y: &ApiElement<'_>) -> Option<f64> {
        let previous = self.strict.previous()?;
        if !matches!(y.kind(), ElementKind::Function | ElementKind::Attribute) {
            return None;
        }
        let new = self.new_api();
        let new_parent = new.parent_of(y.id())?;
        let name = y.name();
        for ancestor in new.ancestors(new_parent) {
            for member in new.children(&ancestor, y.kind()) {
                let overridden = new
                    .element(member)
                    .is_some_and(|element| element.name() == name);
                if overridden && previous.maps(x.id(), member) {
                    return previous.mapping_for_source(x.id()).map(|m| m.similarity());
                }
            }
        }
        None
    }
}

impl Differ for InheritanceDiffer<'_> {
    fn stage(&self) -> DifferStage {
        DifferStage::Inheritance
    }

    fn similarity(&self, x: ApiElement<'_>, y: ApiElement<'_>) -> f64 {
        let mut score = if self.strict.containers_consistent(&x, &y) {
            self.strict.similarity(x, y)
        } else if self.related_through_inheritance(&x, &y) {
            self.strict.naive().similarity(x, y)
        } else {
            0.0
        };
        if let Some(inherited) = self.overridden_similarity(&x, &y) {
            if inherited > score {
                score += self.boost * (inherited - score);
            }
        }
        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::fixtures::add_class_with_method;
    use crate::model::mapping::Mapping;

    fn one_to_one(kind: ElementKind, source: &str, target: &str, similarity: f64) -> Mapping {
        Mapping::OneToOne {
            kind,
            source: source.to_string(),
            target: target.to_string(),
            similarity,
        }
    }

    #[test]
    fn test_member_moved_to_subclass_is_accepted() {
        let mut old = Api::new("test", "test", "1");
        add_class_with_method(&mut old, "Base", &[], "fit", "x");
        let mut new = Api::new("test", "test", "2");
        add_class_with_method(&mut new, "Base", &[], "predict", "y");
        add_class_with_method(&mut new, "Child", &["Base"], "fit", "x");

        let mut previous = MappingSet::new();
        previous
            .push(one_to_one(
                ElementKind::Class,
                "test/test/Base",
                "test/test/Base",
                0.9,
            ))
            .unwrap();

        let x = old.element("test/test/Base/fit").unwrap();
        let y = new.element("test/test/Child/fit").unwrap();

        let strict = StrictDiffer::new(&old, &new, Some(&previous));
        assert_eq!(strict.similarity(x, y), 0.0);

        let differ = InheritanceDiffer::new(&old, &new, Some(&previous), 0.5);
        assert!(differ.similarity(x, y) > 0.9);
    }

    #[test]
    fn test_override_is_boosted_toward_previous_score() {
        let mut old = Api::new("test", "test", "1");
        add_class_with_method(&mut old, "Base", &[], "fit", "x");
        let mut new = Api::new("test", "test", "2");
        add_class_with_method(&mut new, "Base", &[], "fit", "x");
        add_class_with_method(&mut new, "Child", &["Base"], "fit", "data");

        let mut previous = MappingSet::new();
        previous
            .push(one_to_one(
                ElementKind::Class,
                "test/test/Base",
                "test/test/Child",
                0.7,
            ))
            .unwrap();
        previous
            .push(one_to_one(
                ElementKind::Function,
                "test/test/Base/fit",
                "test/test/Base/fit",
                1.0,
            ))
            .unwrap();

        let x = old.element("test/test/Base/fit").unwrap();
        let y = new.element("test/test/Child/fit").unwrap();
        let plain = StrictDiffer::new(&old, &new, Some(&previous)).similarity(x, y);
        let boosted = InheritanceDiffer::new(&old, &new, Some(&previous), 0.5).similarity(x, y);
        assert!(plain < 1.0);
        assert!((boosted - (plain + 0.5 * (1.0 - plain))).abs() < 1e-9);
    }

    #[test]
    fn test_without_previous_matches_naive() {
        let mut old = Api::new("test", "test", "1");
        add_class_with_method(&mut old, "Base", &[], "fit", "x");
        let new = old.clone();
        let differ = InheritanceDiffer::new(&old, &new, None, 0.5);
        let naive = crate::differ::NaiveDiffer::new(&old, &new);
        let x = old.element("test/test/Base/fit").unwrap();
        assert_eq!(differ.similarity(x, x), naive.similarity(x, x));
    }
}
