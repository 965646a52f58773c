//! Call-site usage counts, as produced by the usage counter.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{ApiDriftError, ApiDriftResult};
use crate::model::api::Parameter;

/// Invocation counts per element and, per parameter, how often each literal
/// was passed explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageCounts {
    #[serde(default)]
    pub class_usages: IndexMap<String, usize>,
    #[serde(default)]
    pub function_usages: IndexMap<String, usize>,
    #[serde(default)]
    pub parameter_usages: IndexMap<String, usize>,
    #[serde(default)]
    pub value_usages: IndexMap<String, IndexMap<String, usize>>,
}

impl UsageCounts {
    pub fn from_json(text: &str) -> ApiDriftResult<Self> {
        let counts: UsageCounts = serde_json::from_str(text)?;
        for (parameter, values) in &counts.value_usages {
            let explicit: usize = values.values().sum();
            let declared = counts.parameter_usages.get(parameter).copied().unwrap_or(0);
            if explicit > declared {
                return Err(ApiDriftError::InvalidDocument(format!(
                    "{parameter} has {explicit} value usages but only {declared} usages"
                )));
            }
        }
        Ok(counts)
    }

    pub fn load(path: &Path) -> ApiDriftResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn class_usages(&self, id: &str) -> usize {
        self.class_usages.get(id).copied().unwrap_or(0)
    }

    pub fn function_usages(&self, id: &str) -> usize {
        self.function_usages.get(id).copied().unwrap_or(0)
    }

    pub fn parameter_usages(&self, id: &str) -> usize {
        self.parameter_usages.get(id).copied().unwrap_or(0)
    }

    /// Multiset of values seen for `parameter` across all calls of
    /// `function_calls` invocations. Calls that omit an optional parameter
    /// count as passing its default.
    pub fn effective_values(&self, parameter: &Parameter, function_calls: usize) -> IndexMap<String, usize> {
        let mut values = self
            .value_usages
            .get(&parameter.id)
            .cloned()
            .unwrap_or_default();
        let explicit: usize = values.values().sum();
        if let Some(default) = &parameter.default_value {
            let omitted = function_calls.saturating_sub(explicit);
            if omitted > 0 {
                *values.entry(default.clone()).or_insert(0) += omitted;
            }
        }
        values.retain(|_, count| *count > 0);
        values
    }
}
