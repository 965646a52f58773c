//! apidrift core library: API evolution analysis between two versions of a
//! library.
//!
//! Docstring type text is parsed into structured types, the elements of two
//! API snapshots are matched by a staged differ pipeline, and annotations
//! written against the old version are migrated along the resulting
//! mappings. With the `python` feature the crate also builds the
//! `_apidrift_core` extension module.

pub mod config;
pub mod differ;
pub mod docstring;
pub mod errors;
pub mod generator;
pub mod migration;
pub mod model;
pub mod store;

#[cfg(feature = "python")]
mod python;

pub use config::{DifferConfig, MigrationConfig, SimilarityWeights};
pub use differ::pipeline::{run_pipeline, run_stage, PipelineOutcome};
pub use differ::DifferStage;
pub use docstring::parse_type;
pub use errors::{ApiDriftError, ApiDriftResult};
pub use migration::{migrate, MigrationOutcome};
