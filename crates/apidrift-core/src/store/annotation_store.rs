//! Persisted annotation store.
//!
//! Document layout: one object per annotation kind, keyed by target
//! identity, next to an integer `schemaVersion`:
//!
//! ```json
//! {
//!   "schemaVersion": 2,
//!   "moveAnnotations": {
//!     "lib/lib.mod/fn": { "target": "lib/lib.mod/fn", "destination": "lib.other", ... }
//!   },
//!   ...
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{ApiDriftError, ApiDriftResult};
use crate::model::annotations::{Annotation, AnnotationKind};

pub const ANNOTATION_SCHEMA_VERSION: i64 = 2;
const OLDEST_SCHEMA_VERSION: i64 = 1;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Annotations in processing order, at most one per conflicting
/// `(kind, target)` pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationStore {
    annotations: IndexMap<(AnnotationKind, String), Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `annotation`, evicting every annotation on the same target whose
    /// kind conflicts with it. Returns the evicted annotations.
    pub fn add(&mut self, annotation: Annotation) -> Vec<Annotation> {
        let kind = annotation.kind();
        let target = annotation.target().to_string();
        let mut evicted = Vec::new();
        for other in AnnotationKind::ALL {
            if !other.conflicts_with(kind) {
                continue;
            }
            if let Some(old) = self.annotations.shift_remove(&(other, target.clone())) {
                debug!("{} on {} replaced by {}", old.kind(), target, kind);
                evicted.push(old);
            }
        }
        self.annotations.insert((kind, target), annotation);
        evicted
    }

    pub fn extend(&mut self, annotations: impl IntoIterator<Item = Annotation>) {
        for annotation in annotations {
            self.add(annotation);
        }
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.values()
    }

    pub fn of_kind(&self, kind: AnnotationKind) -> impl Iterator<Item = &Annotation> {
        self.annotations.values().filter(move |a| a.kind() == kind)
    }

    pub fn get(&self, kind: AnnotationKind, target: &str) -> Option<&Annotation> {
        self.annotations.get(&(kind, target.to_string()))
    }

    pub fn for_target<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Annotation> {
        self.annotations.values().filter(move |a| a.target() == target)
    }

    pub fn count_by_kind(&self) -> BTreeMap<AnnotationKind, usize> {
        let mut counts = BTreeMap::new();
        for annotation in self.annotations.values() {
            *counts.entry(annotation.kind()).or_insert(0) += 1;
        }
        counts
    }

    // -- persistence ---------------------------------------------------------

    pub fn to_json(&self) -> ApiDriftResult<String> {
        let mut kinds: BTreeMap<&'static str, BTreeMap<&str, serde_json::Value>> = AnnotationKind::ALL
            .into_iter()
            .map(|kind| (kind.store_key(), BTreeMap::new()))
            .collect();
        for annotation in self.annotations.values() {
            let entry = kinds.entry(annotation.kind().store_key()).or_default();
            entry.insert(annotation.target(), annotation.to_fields()?);
        }
        let document = StoreDocumentOut {
            schema_version: ANNOTATION_SCHEMA_VERSION,
            kinds,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn from_json(text: &str) -> ApiDriftResult<Self> {
        let document: StoreDocumentIn = serde_json::from_str(text)?;
        if document.schema_version > ANNOTATION_SCHEMA_VERSION {
            return Err(ApiDriftError::UnsupportedSchema {
                found: document.schema_version,
                supported: ANNOTATION_SCHEMA_VERSION,
            });
        }
        if document.schema_version < OLDEST_SCHEMA_VERSION {
            return Err(ApiDriftError::InvalidDocument(format!(
                "schemaVersion {} is not a valid annotation store version",
                document.schema_version
            )));
        }

        let mut by_kind: BTreeMap<AnnotationKind, IndexMap<String, serde_json::Value>> =
            BTreeMap::new();
        for (key, entries) in document.kinds {
            let kind = AnnotationKind::from_store_key(&key).ok_or_else(|| {
                ApiDriftError::InvalidDocument(format!("unknown annotation kind key {key:?}"))
            })?;
            by_kind.insert(kind, entries);
        }

        let mut store = AnnotationStore::new();
        for (kind, entries) in by_kind {
            for (target, mut fields) in entries {
                let Some(object) = fields.as_object_mut() else {
                    return Err(ApiDriftError::InvalidDocument(format!(
                        "{} entry for {target} is not an object",
                        kind.store_key()
                    )));
                };
                object
                    .entry("target")
                    .or_insert_with(|| serde_json::Value::from(target.clone()));
                let annotation = Annotation::from_fields(kind, fields).map_err(|err| {
                    ApiDriftError::InvalidDocument(format!(
                        "{} entry for {target}: {err}",
                        kind.store_key()
                    ))
                })?;
                if annotation.target() != target {
                    return Err(ApiDriftError::InvalidDocument(format!(
                        "{} entry keyed {target} targets {}",
                        kind.store_key(),
                        annotation.target()
                    )));
                }
                // Kinds load in store order, so of two conflicting kinds the
                // later one is kept.
                for dropped in store.add(annotation) {
                    warn!(
                        "{} on {} conflicts with {} in the loaded store; dropped",
                        dropped.kind(),
                        target,
                        kind
                    );
                }
            }
        }
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> ApiDriftResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json()?)?;
        debug!("wrote {} annotations to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> ApiDriftResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl<'a> IntoIterator for &'a AnnotationStore {
    type Item = &'a Annotation;
    type IntoIter = indexmap::map::Values<'a, (AnnotationKind, String), Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.values()
    }
}

impl FromIterator<Annotation> for AnnotationStore {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let mut store = AnnotationStore::new();
        store.extend(iter);
        store
    }
}

// ---------------------------------------------------------------------------
// Document shapes
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StoreDocumentOut<'a> {
    #[serde(rename = "schemaVersion")]
    schema_version: i64,
    #[serde(flatten)]
    kinds: BTreeMap<&'static str, BTreeMap<&'a str, serde_json::Value>>,
}

#[derive(Deserialize)]
struct StoreDocumentIn {
    #[serde(rename = "schemaVersion", default = "legacy_schema_version")]
    schema_version: i64,
    #[serde(flatten)]
    kinds: IndexMap<String, IndexMap<String, serde_json::Value>>,
}

fn legacy_schema_version() -> i64 {
    OLDEST_SCHEMA_VERSION
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::annotations::{AnnotationHeader, DefaultValue, ReviewResult};

    fn header(target: &str) -> AnnotationHeader {
        AnnotationHeader::new(target, "alice")
    }

    fn move_to(target: &str, destination: &str) -> Annotation {
        Annotation::Move {
            header: header(target),
            destination: destination.into(),
        }
    }

    #[test]
    fn test_same_kind_latest_wins() {
        let mut store = AnnotationStore::new();
        store.add(move_to("lib/f", "lib.a"));
        let evicted = store.add(move_to("lib/f", "lib.b"));
        assert_eq!(evicted.len(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(AnnotationKind::Move, "lib/f"),
            Some(&move_to("lib/f", "lib.b"))
        );
    }

    #[test]
    fn test_value_kinds_exclude_each_other() {
        let mut store = AnnotationStore::new();
        store.add(Annotation::Required {
            header: header("lib/f/x"),
        });
        store.add(Annotation::Rename {
            header: header("lib/f/x"),
            new_name: "y".into(),
        });
        store.add(Annotation::Constant {
            header: header("lib/f/x"),
            default: DefaultValue::Number(3.0),
        });
        let kinds: Vec<AnnotationKind> = store.for_target("lib/f/x").map(|a| a.kind()).collect();
        assert_eq!(kinds, vec![AnnotationKind::Rename, AnnotationKind::Constant]);
    }

    #[test]
    fn test_json_lists_every_kind_and_version() {
        let mut store = AnnotationStore::new();
        store.add(move_to("lib/f", "lib.a"));
        let value: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        assert_eq!(value["schemaVersion"], 2);
        for kind in AnnotationKind::ALL {
            assert!(value.get(kind.store_key()).is_some(), "{}", kind.store_key());
        }
        assert_eq!(value["moveAnnotations"]["lib/f"]["destination"], "lib.a");
        assert_eq!(value["moveAnnotations"]["lib/f"]["authors"][0], "alice");
    }

    #[test]
    fn test_save_and_load_preserve_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("annotations.json");

        let mut store = AnnotationStore::new();
        store.add(move_to("lib/f", "lib.a"));
        let mut todo = Annotation::Todo {
            header: header("lib/g"),
            new_todo: "check this".into(),
        };
        todo.mark_unsure("split".into());
        store.add(todo);
        store.add(Annotation::Optional {
            header: header("lib/f/x"),
            default: DefaultValue::String("auto".into()),
        });
        store.save(&path).unwrap();

        let loaded = AnnotationStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        let todo = loaded.get(AnnotationKind::Todo, "lib/g").unwrap();
        assert_eq!(todo.review_result(), ReviewResult::Unsure);
        assert_eq!(
            loaded.get(AnnotationKind::Optional, "lib/f/x"),
            store.get(AnnotationKind::Optional, "lib/f/x")
        );
        // Reloaded order is kind order.
        let kinds: Vec<AnnotationKind> = loaded.iter().map(|a| a.kind()).collect();
        assert_eq!(
            kinds,
            vec![AnnotationKind::Optional, AnnotationKind::Move, AnnotationKind::Todo]
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        let build = |order: &[(&str, &str)]| {
            let mut store = AnnotationStore::new();
            for (target, destination) in order {
                store.add(move_to(target, destination));
            }
            store.to_json().unwrap()
        };
        assert_eq!(
            build(&[("lib/a", "x"), ("lib/b", "y")]),
            build(&[("lib/b", "y"), ("lib/a", "x")])
        );
    }

    #[test]
    fn test_conflicting_kinds_in_document_keep_later_kind() {
        let optional = Annotation::Optional {
            header: header("lib/f/x"),
            default: DefaultValue::Number(1.0),
        };
        let constant = Annotation::Constant {
            header: header("lib/f/x"),
            default: DefaultValue::Number(2.0),
        };
        let document = serde_json::json!({
            "schemaVersion": 2,
            "constantAnnotations": {"lib/f/x": constant.to_fields().unwrap()},
            "optionalAnnotations": {"lib/f/x": optional.to_fields().unwrap()},
        });
        let store = AnnotationStore::from_json(&document.to_string()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(AnnotationKind::Constant, "lib/f/x"), Some(&constant));
    }

    #[test]
    fn test_readding_moves_annotation_to_the_end() {
        let mut store = AnnotationStore::new();
        store.add(move_to("lib/a", "x"));
        store.add(move_to("lib/b", "y"));
        store.add(move_to("lib/a", "z"));
        let targets: Vec<&str> = store.iter().map(|a| a.target()).collect();
        assert_eq!(targets, vec!["lib/b", "lib/a"]);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let err = AnnotationStore::from_json(r#"{"schemaVersion": 3}"#).unwrap_err();
        assert!(matches!(
            err,
            ApiDriftError::UnsupportedSchema {
                found: 3,
                supported: 2
            }
        ));
    }

    #[test]
    fn test_legacy_document_without_version_loads() {
        let store = AnnotationStore::from_json(
            r#"{"renameAnnotations": {"lib/f": {"authors": ["bob"], "newName": "g"}}}"#,
        )
        .unwrap();
        let rename = store.get(AnnotationKind::Rename, "lib/f").unwrap();
        assert_eq!(rename.header().authors, vec!["bob".to_string()]);
    }

    #[test]
    fn test_unknown_kind_key_is_invalid() {
        let err = AnnotationStore::from_json(r#"{"schemaVersion": 2, "fooAnnotations": {}}"#)
            .unwrap_err();
        assert!(matches!(err, ApiDriftError::InvalidDocument(_)));
    }

    #[test]
    fn test_mismatched_target_is_invalid() {
        let err = AnnotationStore::from_json(
            r#"{"moveAnnotations": {"lib/f": {"target": "lib/g", "destination": "x"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ApiDriftError::InvalidDocument(_)));
    }
}
