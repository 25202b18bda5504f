//! Ensemble forecast configuration.
//!
//! The 75/25 weighting and the 60/80 confidence levels have no derivation
//! behind them; they are exposed here so callers can tune them.

use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ForecastConfig {
    /// Weight of the trend projection in the blend. Default: 0.75.
    pub trend_weight: Option<f64>,
    /// Confidence when a trend projection was used. Default: 80.
    pub confidence_with_trend: Option<u8>,
    /// Confidence for EVM-only forecasts. Default: 60.
    pub confidence_evm_only: Option<u8>,
    /// History points required for a trend fit. Default: 3.
    pub min_history_points: Option<usize>,
    /// Forecast cache validity in seconds. Default: 3600.
    pub cache_validity_secs: Option<u64>,
    /// Open-risk count above which a risk factor is raised. Default: 5.
    pub high_risk_count: Option<u32>,
}

impl ForecastConfig {
    pub fn effective_trend_weight(&self) -> f64 {
        self.trend_weight.unwrap_or(constants::DEFAULT_TREND_WEIGHT)
    }

    pub fn effective_confidence_with_trend(&self) -> u8 {
        self.confidence_with_trend
            .unwrap_or(constants::DEFAULT_CONFIDENCE_WITH_TREND)
    }

    pub fn effective_confidence_evm_only(&self) -> u8 {
        self.confidence_evm_only
            .unwrap_or(constants::DEFAULT_CONFIDENCE_EVM_ONLY)
    }

    /// Never below 3: a line through two points has no residual to speak of.
    pub fn effective_min_history_points(&self) -> usize {
        self.min_history_points
            .unwrap_or(constants::DEFAULT_MIN_HISTORY_POINTS)
            .max(constants::DEFAULT_MIN_HISTORY_POINTS)
    }

    pub fn effective_cache_validity_secs(&self) -> u64 {
        self.cache_validity_secs
            .unwrap_or(constants::DEFAULT_CACHE_VALIDITY_SECS)
    }

    pub fn effective_high_risk_count(&self) -> u32 {
        self.high_risk_count
            .unwrap_or(constants::DEFAULT_HIGH_RISK_COUNT)
    }
}
