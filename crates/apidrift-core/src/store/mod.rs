//! Persisted documents: annotation stores, API snapshots, mapping reports.

pub mod annotation_store;
pub mod report;
pub mod snapshot;

pub use annotation_store::{AnnotationStore, ANNOTATION_SCHEMA_VERSION};
pub use report::MappingReport;
pub use snapshot::{api_from_json, api_to_json, load_api};
