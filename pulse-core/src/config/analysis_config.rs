//! Threshold and horizon configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Attention thresholds and trend horizon.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// SPI below which a project needs attention. Default: 0.9.
    pub spi_threshold: Option<f64>,
    /// CPI below which a project needs attention. Default: 0.9.
    pub cpi_threshold: Option<f64>,
    /// Months projected forward by the trend regressor. Default: 3.
    pub forecast_horizon_months: Option<u32>,
}

impl AnalysisConfig {
    /// Returns the effective SPI threshold, defaulting to 0.9.
    pub fn effective_spi_threshold(&self) -> f64 {
        self.spi_threshold.unwrap_or(constants::DEFAULT_SPI_THRESHOLD)
    }

    /// Returns the effective CPI threshold, defaulting to 0.9.
    pub fn effective_cpi_threshold(&self) -> f64 {
        self.cpi_threshold.unwrap_or(constants::DEFAULT_CPI_THRESHOLD)
    }

    /// Returns the effective horizon, defaulting to 3 months.
    pub fn effective_forecast_horizon(&self) -> u32 {
        self.forecast_horizon_months
            .unwrap_or(constants::DEFAULT_FORECAST_HORIZON_MONTHS)
    }
}
