//! Monthly performance history.

use serde::{Deserialize, Serialize};

use crate::types::{MonthKey, ProjectId};

/// One month of SPI/CPI for one project.
///
/// Indices are expected to be > 0; zero, negative, or non-finite values are
/// kept as-is and treated as degenerate by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub project_id: ProjectId,
    pub month: MonthKey,
    pub spi: f64,
    pub cpi: f64,
}

impl HistoryRecord {
    pub fn new(project_id: impl Into<ProjectId>, month: MonthKey, spi: f64, cpi: f64) -> Self {
        Self {
            project_id: project_id.into(),
            month,
            spi,
            cpi,
        }
    }
}
