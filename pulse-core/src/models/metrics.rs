//! Aggregated performance metrics.

use serde::{Deserialize, Serialize};

/// Where a project's current SPI/CPI came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSource {
    /// Summed task earned value / planned / actual cost.
    Tasks,
    /// The project's own reported indices.
    Project,
    /// Most recent history month.
    History,
    /// Nothing available; neutral 1.0.
    Default,
}

/// Current EVM indices for one project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentMetrics {
    pub spi: f64,
    pub cpi: f64,
    pub planned_cost: f64,
    pub earned_value: f64,
    /// Summed task actual cost, when the project has tasks.
    pub actual_cost: Option<f64>,
    /// Earned value / planned cost clamped to 0..=1, when computable.
    pub progress: Option<f64>,
    pub source: IndexSource,
}

impl CurrentMetrics {
    /// Neutral indices with no cost information.
    pub fn neutral() -> Self {
        Self {
            spi: 1.0,
            cpi: 1.0,
            planned_cost: 0.0,
            earned_value: 0.0,
            actual_cost: None,
            progress: None,
            source: IndexSource::Default,
        }
    }
}

/// Portfolio-level rollup from the latest history month per project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub avg_spi: f64,
    pub avg_cpi: f64,
    /// Latest mean minus the mean of each project's second-most-recent month.
    pub spi_change: f64,
    pub cpi_change: f64,
    pub total_projects: usize,
    pub active_projects: usize,
    pub at_risk_projects: usize,
    /// Projects with at least one history record.
    pub reporting_projects: usize,
}

/// Per-project status snapshot for dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatusMetrics {
    pub latest_spi: f64,
    pub latest_cpi: f64,
    pub spi_change: f64,
    pub cpi_change: f64,
    pub actual_cost: f64,
    /// Actual cost as a percentage of budget.
    pub spend_percentage: f64,
    /// Elapsed share of the planned window, 0..=100.
    pub schedule_progress: f64,
    pub days_remaining: i64,
}
