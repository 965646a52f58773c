//! Error types for the apidrift core library.

#[cfg(feature = "python")]
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;

/// Top-level error enum for the apidrift core library.
///
/// Parsing and similarity scoring never fail; the variants here cover
/// persisted documents and invariant violations on internally produced
/// mappings.
#[derive(Debug, thiserror::Error)]
pub enum ApiDriftError {
    #[error("Inconsistent mapping: {0}")]
    Inconsistent(String),

    #[error("Unsupported annotation schema version {found} (supported up to {supported})")]
    UnsupportedSchema { found: i64, supported: i64 },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<ApiDriftError> for PyErr {
    fn from(err: ApiDriftError) -> PyErr {
        match &err {
            ApiDriftError::Inconsistent(_) => PyRuntimeError::new_err(err.to_string()),
            ApiDriftError::UnsupportedSchema { .. } => PyValueError::new_err(err.to_string()),
            ApiDriftError::InvalidDocument(_) => PyValueError::new_err(err.to_string()),
            ApiDriftError::Io(_) => PyIOError::new_err(err.to_string()),
            ApiDriftError::Json(_) => PyValueError::new_err(err.to_string()),
        }
    }
}

pub type ApiDriftResult<T> = Result<T, ApiDriftError>;
