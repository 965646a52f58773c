//! Carries annotations from an old snapshot over to a new one along a
//! mapping.
//!
//! Unambiguous mappings (1:1, n:1) re-target annotations verbatim into the
//! confident output. Splits (1:n) keep the annotation on the most similar
//! target and leave a review note on the others; n:m components only get
//! review notes. Review notes go to the unsure output.

pub mod todo;

use tracing::{debug, info};

use crate::config::MigrationConfig;
use crate::errors::ApiDriftResult;
use crate::model::annotations::{Annotation, AnnotationKind};
use crate::model::api::{simple_name, Api};
use crate::model::mapping::{Mapping, MappingSet};
use crate::model::types::TypeFamily;
use crate::store::AnnotationStore;

use self::todo::{todo_text, TodoBoard};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationOutcome {
    pub confident: AnnotationStore,
    pub unsure: AnnotationStore,
    /// Annotations whose element disappeared or whose type no longer
    /// supports them.
    pub dropped: usize,
}

/// Migrate every annotation of `previous` in declaration order.
///
/// Fails with [`ApiDriftError::Inconsistent`](crate::errors::ApiDriftError::Inconsistent)
/// when a mapping target is missing from `new_api` or has another kind.
pub fn migrate(
    previous: &AnnotationStore,
    mappings: &MappingSet,
    new_api: &Api,
    config: &MigrationConfig,
) -> ApiDriftResult<MigrationOutcome> {
    mappings.validate_targets(new_api)?;
    let author = config.migration_author.as_str();
    let mut outcome = MigrationOutcome::default();
    let mut todos = TodoBoard::default();

    for annotation in previous {
        let Some(mapping) = mappings.mapping_for_source(annotation.target()) else {
            debug!("dropping {} on {}: element removed", annotation.kind(), annotation.target());
            outcome.dropped += 1;
            continue;
        };
        match mapping {
            Mapping::OneToOne { target, .. } | Mapping::ManyToOne { target, .. } => {
                match carry(annotation, target, new_api, author) {
                    Some(migrated) => {
                        outcome.confident.add(migrated);
                    }
                    None => outcome.dropped += 1,
                }
            }
            Mapping::OneToMany { targets, .. } => {
                let Some((best, others)) = targets.split_first() else {
                    continue;
                };
                match carry(annotation, best, new_api, author) {
                    Some(migrated) => {
                        outcome.confident.add(migrated);
                    }
                    None => outcome.dropped += 1,
                }
                let candidates: Vec<&str> = targets.iter().map(String::as_str).collect();
                for other in others {
                    todos.push(other, todo_text(annotation, &candidates));
                }
            }
            Mapping::ManyToMany { targets, .. } => {
                let candidates: Vec<&str> = targets.iter().map(String::as_str).collect();
                for target in targets {
                    todos.push(target, todo_text(annotation, &candidates));
                }
            }
        }
    }

    for todo in todos.into_annotations(author) {
        outcome.unsure.add(todo);
    }

    info!(
        "migrated {} annotations: {} confident, {} unsure, {} dropped",
        previous.len(),
        outcome.confident.len(),
        outcome.unsure.len(),
        outcome.dropped
    );
    Ok(outcome)
}

/// Re-target `annotation` onto `new_target`, or `None` when the new element
/// cannot hold it.
fn carry(annotation: &Annotation, new_target: &str, new_api: &Api, author: &str) -> Option<Annotation> {
    let element = new_api.element(new_target);

    let required_family = match annotation.kind() {
        AnnotationKind::Boundary => Some(TypeFamily::Boundary),
        AnnotationKind::Enum => Some(TypeFamily::Enum),
        _ => None,
    };
    if let Some(family) = required_family {
        let compatible = element
            .and_then(|e| e.ty())
            .is_some_and(|ty| ty.contains_family(family));
        if !compatible {
            debug!(
                "dropping {} on {}: {new_target} has no {family:?} type",
                annotation.kind(),
                annotation.target()
            );
            return None;
        }
    }

    let mut migrated = annotation.migrated(new_target, author);
    if let Annotation::Rename { new_name, .. } = annotation {
        let current = element.map(|e| e.name()).unwrap_or_else(|| simple_name(new_target));
        let old_name = simple_name(annotation.target());
        if current != new_name.as_str() && current != old_name {
            migrated.mark_unsure(format!(
                "element was renamed from {old_name} to {current}; check that the rename to {new_name} still applies"
            ));
        }
    }
    Some(migrated)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
