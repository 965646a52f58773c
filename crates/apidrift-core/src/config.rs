//! Explicit configuration for the differ pipeline and the migrator.
//!
//! Nothing here is global: callers build a config (usually via `Default` or
//! `from_env`) and pass it into the stage that needs it.

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;
pub const DEFAULT_INHERITANCE_BOOST: f64 = 0.5;
pub const DEFAULT_MIGRATION_AUTHOR: &str = "$migration$";

const THRESHOLD_ENV: &str = "APIDRIFT_SIMILARITY_THRESHOLD";
const BOOST_ENV: &str = "APIDRIFT_INHERITANCE_BOOST";
const AUTHOR_ENV: &str = "APIDRIFT_MIGRATION_AUTHOR";

fn unit_interval_env(name: &str, fallback: f64) -> f64 {
    match std::env::var(name) {
        Ok(val) => match val.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => parsed.clamp(0.0, 1.0),
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

// ---------------------------------------------------------------------------
// Differ configuration
// ---------------------------------------------------------------------------

/// Settings shared by every differ stage and the mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferConfig {
    /// Minimum similarity for two elements to be considered a candidate pair.
    pub similarity_threshold: f64,
    /// Fraction by which an overriding member's score moves toward the score
    /// of the member it overrides.
    pub inheritance_boost: f64,
}

impl Default for DifferConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            inheritance_boost: DEFAULT_INHERITANCE_BOOST,
        }
    }
}

impl DifferConfig {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            similarity_threshold: threshold.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Read overrides from `APIDRIFT_SIMILARITY_THRESHOLD` and
    /// `APIDRIFT_INHERITANCE_BOOST`. Invalid values keep the defaults.
    pub fn from_env() -> Self {
        Self {
            similarity_threshold: unit_interval_env(THRESHOLD_ENV, DEFAULT_SIMILARITY_THRESHOLD),
            inheritance_boost: unit_interval_env(BOOST_ENV, DEFAULT_INHERITANCE_BOOST),
        }
    }
}

// ---------------------------------------------------------------------------
// Migration configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MigrationConfig {
    /// Marker appended to the author list of every migrated annotation.
    pub migration_author: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migration_author: DEFAULT_MIGRATION_AUTHOR.to_string(),
        }
    }
}

impl MigrationConfig {
    pub fn from_env() -> Self {
        match std::env::var(AUTHOR_ENV) {
            Ok(val) if !val.trim().is_empty() => Self {
                migration_author: val.trim().to_string(),
            },
            _ => Self::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Similarity weights
// ---------------------------------------------------------------------------

/// Relative weight of each similarity signal. Fixed per differ stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityWeights {
    pub name: f64,
    pub type_: f64,
    pub documentation: f64,
    pub structure: f64,
    pub code: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            name: 0.35,
            type_: 0.20,
            documentation: 0.20,
            structure: 0.15,
            code: 0.10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_threshold_clamps() {
        assert_eq!(DifferConfig::with_threshold(1.7).similarity_threshold, 1.0);
        assert_eq!(DifferConfig::with_threshold(-0.2).similarity_threshold, 0.0);
    }

    #[test]
    fn test_unit_interval_env_fallback_on_missing() {
        let value = unit_interval_env("APIDRIFT_TEST_UNSET_VARIABLE_XYZ", 0.42);
        assert_eq!(value, 0.42);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = SimilarityWeights::default();
        let total = w.name + w.type_ + w.documentation + w.structure + w.code;
        assert!((total - 1.0).abs() < 1e-9);
    }
}
