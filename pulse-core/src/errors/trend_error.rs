//! Trend regression outcomes that mean "model not used".

use super::error_code::{self, PulseErrorCode};

/// Reasons the trend regressor produced no usable projection.
/// Callers fall back to the EVM-only forecast.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrendError {
    #[error("Insufficient history: {points} points, need {required}")]
    InsufficientHistory { points: usize, required: usize },

    #[error("Projected {metric} of {projected:.3} is not a usable index")]
    NotUsable { metric: &'static str, projected: f64 },
}

impl PulseErrorCode for TrendError {
    fn error_code(&self) -> &'static str {
        error_code::TREND_UNAVAILABLE
    }
}
