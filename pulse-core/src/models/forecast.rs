//! Forecast result types.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{ForecastError, PulseErrorCode};
use crate::types::ProjectId;

/// A model that contributed to a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastModel {
    /// Closed-form earned value extrapolation.
    Evm,
    /// Linear SPI trend drove the completion date.
    ScheduleTrend,
    /// Linear CPI trend drove the final cost.
    CostTrend,
}

impl ForecastModel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Evm => "evm",
            Self::ScheduleTrend => "schedule_trend",
            Self::CostTrend => "cost_trend",
        }
    }
}

impl fmt::Display for ForecastModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Blended forecast for one project. Created once per analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub project_id: ProjectId,
    pub forecast_completion_date: NaiveDate,
    pub completion_date_best: NaiveDate,
    pub completion_date_worst: NaiveDate,
    pub forecast_final_cost: f64,
    pub final_cost_best: f64,
    pub final_cost_worst: f64,
    /// Either the EVM-only or the with-trend confidence level (0-100).
    pub confidence: u8,
    /// Positive = late.
    pub schedule_variance_days: i64,
    /// Positive = over budget.
    pub cost_variance: f64,
    /// Narrative risk factors in check order.
    pub risk_factors: Vec<String>,
    pub forecast_models_used: BTreeSet<ForecastModel>,
    /// SPI the forecast was computed from.
    pub spi_used: f64,
    /// CPI the forecast was computed from.
    pub cpi_used: f64,
}

impl ForecastResult {
    pub fn used(&self, model: ForecastModel) -> bool {
        self.forecast_models_used.contains(&model)
    }

    /// Cost variance as a percentage of `budget`, or 0 for a non-positive budget.
    pub fn budget_variance_pct(&self, budget: f64) -> f64 {
        if budget > 0.0 {
            self.cost_variance / budget * 100.0
        } else {
            0.0
        }
    }
}

/// A project the batch could not forecast, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedProject {
    pub project_id: ProjectId,
    pub code: String,
    pub reason: String,
}

impl SkippedProject {
    pub fn from_error(project_id: ProjectId, error: &ForecastError) -> Self {
        Self {
            project_id,
            code: error.error_code().to_string(),
            reason: error.to_string(),
        }
    }
}
