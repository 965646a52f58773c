//! Second stage: naive scores, restricted to pairs whose containers agree
//! with the previous mapping.

use crate::differ::naive::NaiveDiffer;
use crate::differ::{Differ, DifferStage};
use crate::model::api::{Api, ApiElement};
use crate::model::mapping::MappingSet;

pub struct StrictDiffer<'a> {
    naive: NaiveDiffer<'a>,
    previous: Option<&'a MappingSet>,
}

impl<'a> StrictDiffer<'a> {
    pub fn new(old: &'a Api, new: &'a Api, previous: Option<&'a MappingSet>) -> Self {
        Self {
            naive: NaiveDiffer::new(old, new),
            previous,
        }
    }

    pub fn naive(&self) -> &NaiveDiffer<'a> {
        &self.naive
    }

    pub fn previous(&self) -> Option<&'a MappingSet> {
        self.previous
    }

    /// Containing class/function of `x` in the old snapshot and of `y` in
    /// the new one.
    pub fn containers(&self, x: &ApiElement<'_>, y: &ApiElement<'_>) -> (Option<&'a str>, Option<&'a str>) {
        (
            self.naive.old().parent_of(x.id()),
            self.naive.new_api().parent_of(y.id()),
        )
    }

    /// Both top-level, or the old container is mapped onto the new one.
    /// Without a previous mapping every pair is consistent.
    pub fn containers_consistent(&self, x: &ApiElement<'_>, y: &ApiElement<'_>) -> bool {
        let Some(previous) = self.previous else {
            return true;
        };
        match self.containers(x, y) {
            (None, None) => true,
            (Some(old_parent), Some(new_parent)) => previous.maps(old_parent, new_parent),
            _ => false,
        }
    }
}

impl Differ for StrictDiffer<'_> {
    fn stage(&self) -> DifferStage {
        DifferStage::Strict
    }

    fn similarity(&self, x: ApiElement<'_>, y: ApiElement<'_>) -> f64 {
        if !self.containers_consistent(&x, &y) {
            return 0.0;
        }
        self.naive.similarity(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::fixtures::add_class_with_method;
    use crate::model::api::ElementKind;
    use crate::model::mapping::Mapping;

    fn snapshots() -> (Api, Api) {
        let mut old = Api::new("test", "test", "1");
        add_class_with_method(&mut old, "Alpha", &[], "fit", "x");
        add_class_with_method(&mut old, "Beta", &[], "fit", "x");
        let mut new = Api::new("test", "test", "2");
        add_class_with_method(&mut new, "Alpha", &[], "fit", "x");
        add_class_with_method(&mut new, "Beta", &[], "fit", "x");
        (old, new)
    }

    fn class_mapping(pairs: &[(&str, &str)]) -> MappingSet {
        let mut set = MappingSet::new();
        for (source, target) in pairs {
            set.push(Mapping::OneToOne {
                kind: ElementKind::Class,
                source: format!("test/test/{source}"),
                target: format!("test/test/{target}"),
                similarity: 1.0,
            })
            .unwrap();
        }
        set
    }

    #[test]
    fn test_without_previous_mapping_accepts_cross_container_pairs() {
        let (old, new) = snapshots();
        let differ = StrictDiffer::new(&old, &new, None);
        let x = old.element("test/test/Alpha/fit").unwrap();
        let y = new.element("test/test/Beta/fit").unwrap();
        assert!(differ.similarity(x, y) > 0.0);
    }

    #[test]
    fn test_rejects_pairs_across_unmapped_containers() {
        let (old, new) = snapshots();
        let previous = class_mapping(&[("Alpha", "Alpha"), ("Beta", "Beta")]);
        let differ = StrictDiffer::new(&old, &new, Some(&previous));
        let x = old.element("test/test/Alpha/fit").unwrap();
        assert_eq!(
            differ.similarity(x, new.element("test/test/Beta/fit").unwrap()),
            0.0
        );
        assert!(differ.similarity(x, new.element("test/test/Alpha/fit").unwrap()) > 0.9);
    }

    #[test]
    fn test_top_level_pairs_stay_consistent() {
        let (old, new) = snapshots();
        let previous = MappingSet::new();
        let differ = StrictDiffer::new(&old, &new, Some(&previous));
        let x = old.element("test/test/Alpha").unwrap();
        let y = new.element("test/test/Alpha").unwrap();
        assert_eq!(differ.similarity(x, y), 1.0);
    }
}
