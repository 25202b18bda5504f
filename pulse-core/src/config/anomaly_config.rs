//! Anomaly detection configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Settings for the anomaly pass.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Expected outlier fraction. Default: 0.1.
    pub contamination: Option<f64>,
    /// Isolation forest seed. Default: 42.
    pub seed: Option<u64>,
    /// Number of isolation trees. Default: 100.
    pub n_estimators: Option<usize>,
    /// Subsample size per tree. Default: 256.
    pub max_samples: Option<usize>,
    /// Rows needed before the forest replaces the z-score fallback. Default: 10.
    pub min_forest_rows: Option<usize>,
    /// Fallback deviation threshold in standard deviations. Default: 3.0.
    pub zscore_threshold: Option<f64>,
    /// Metric columns, by name. Empty = the default four.
    #[serde(default)]
    pub metrics: Vec<String>,
}

impl AnomalyConfig {
    pub fn effective_contamination(&self) -> f64 {
        self.contamination.unwrap_or(constants::DEFAULT_CONTAMINATION)
    }

    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(constants::DEFAULT_ANOMALY_SEED)
    }

    pub fn effective_n_estimators(&self) -> usize {
        self.n_estimators
            .unwrap_or(constants::DEFAULT_N_ESTIMATORS)
            .max(1)
    }

    pub fn effective_max_samples(&self) -> usize {
        self.max_samples
            .unwrap_or(constants::DEFAULT_MAX_SAMPLES)
            .max(2)
    }

    pub fn effective_min_forest_rows(&self) -> usize {
        self.min_forest_rows
            .unwrap_or(constants::DEFAULT_MIN_FOREST_ROWS)
    }

    pub fn effective_zscore_threshold(&self) -> f64 {
        self.zscore_threshold
            .unwrap_or(constants::DEFAULT_ZSCORE_THRESHOLD)
    }
}
