//! `_apidrift_core` Python extension module.
//!
//! Every function takes and returns JSON strings so the Python side never
//! needs to mirror the Rust types.

use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::config::{DifferConfig, MigrationConfig};
use crate::differ::pipeline::run_pipeline;
use crate::errors::ApiDriftResult;
use crate::generator::{self, UsageCounts};
use crate::migration;
use crate::store::{api_from_json, AnnotationStore, MappingReport};

fn differ_config(threshold: Option<f64>) -> DifferConfig {
    match threshold {
        Some(threshold) => DifferConfig {
            similarity_threshold: threshold.clamp(0.0, 1.0),
            ..DifferConfig::from_env()
        },
        None => DifferConfig::from_env(),
    }
}

/// Parse docstring type text; returns the type as JSON, or `null`.
#[pyfunction]
#[pyo3(signature = (type_text, description=""))]
fn parse_type(type_text: &str, description: &str) -> PyResult<String> {
    let parsed = crate::docstring::parse_type(type_text, description);
    let json = serde_json::to_string(&parsed).map_err(crate::errors::ApiDriftError::from)?;
    Ok(json)
}

fn diff_apis_impl(old_json: &str, new_json: &str, threshold: Option<f64>) -> ApiDriftResult<String> {
    let old = api_from_json(old_json)?;
    let new = api_from_json(new_json)?;
    let outcome = run_pipeline(&old, &new, &differ_config(threshold))?;
    MappingReport::new(&old, &new, &outcome.mapping).to_json()
}

/// Run the differ pipeline on two snapshot documents; returns the mapping
/// report.
#[pyfunction]
#[pyo3(signature = (old_json, new_json, threshold=None))]
fn diff_apis(old_json: &str, new_json: &str, threshold: Option<f64>) -> PyResult<String> {
    Ok(diff_apis_impl(old_json, new_json, threshold)?)
}

fn migrate_annotations_impl(
    annotations_json: &str,
    old_json: &str,
    new_json: &str,
    threshold: Option<f64>,
) -> ApiDriftResult<String> {
    let previous = AnnotationStore::from_json(annotations_json)?;
    let old = api_from_json(old_json)?;
    let new = api_from_json(new_json)?;
    let outcome = run_pipeline(&old, &new, &differ_config(threshold))?;
    let migrated = migration::migrate(&previous, &outcome.mapping, &new, &MigrationConfig::from_env())?;

    let confident: serde_json::Value = serde_json::from_str(&migrated.confident.to_json()?)?;
    let unsure: serde_json::Value = serde_json::from_str(&migrated.unsure.to_json()?)?;
    let result = serde_json::json!({
        "confident": confident,
        "unsure": unsure,
        "dropped": migrated.dropped,
    });
    Ok(serde_json::to_string(&result)?)
}

/// Diff two snapshots and migrate an annotation store along the result.
/// Returns `{"confident": store, "unsure": store, "dropped": n}`.
#[pyfunction]
#[pyo3(signature = (annotations_json, old_json, new_json, threshold=None))]
fn migrate_annotations(
    annotations_json: &str,
    old_json: &str,
    new_json: &str,
    threshold: Option<f64>,
) -> PyResult<String> {
    Ok(migrate_annotations_impl(
        annotations_json,
        old_json,
        new_json,
        threshold,
    )?)
}

fn generate_annotations_impl(api_json: &str, usages_json: &str, author: &str) -> ApiDriftResult<String> {
    let api = api_from_json(api_json)?;
    let usages = UsageCounts::from_json(usages_json)?;
    generator::generate_annotations(&api, &usages, author).to_json()
}

/// Generate remove/constant/boundary/enum annotations for a snapshot.
#[pyfunction]
#[pyo3(signature = (api_json, usages_json, author="$autogen$"))]
fn generate_annotations(api_json: &str, usages_json: &str, author: &str) -> PyResult<String> {
    Ok(generate_annotations_impl(api_json, usages_json, author)?)
}

// ---------------------------------------------------------------------------
// Top-level Python module: _apidrift_core
// ---------------------------------------------------------------------------

#[pymodule]
fn _apidrift_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add(
        "ANNOTATION_SCHEMA_VERSION",
        crate::store::ANNOTATION_SCHEMA_VERSION,
    )?;
    m.add(
        "DEFAULT_SIMILARITY_THRESHOLD",
        crate::config::DEFAULT_SIMILARITY_THRESHOLD,
    )?;

    m.add_function(wrap_pyfunction!(parse_type, m)?)?;
    m.add_function(wrap_pyfunction!(diff_apis, m)?)?;
    m.add_function(wrap_pyfunction!(migrate_annotations, m)?)?;
    m.add_function(wrap_pyfunction!(generate_annotations, m)?)?;
    Ok(())
}
