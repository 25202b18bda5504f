//! Anomaly detection results.
//!
//! The score carries its method so that isolation-forest scores and
//! z-score column counts can never be compared by accident.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::ProjectId;

/// Method used to score a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyMethod {
    Forest,
    ZScore,
}

impl AnomalyMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Forest => "isolation_forest",
            Self::ZScore => "z_score",
        }
    }
}

impl fmt::Display for AnomalyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Method-tagged anomaly score. Higher = more anomalous within a method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AnomalyScore {
    /// Absolute isolation-forest decision value.
    Forest { score: f64 },
    /// Number of metric columns beyond the z-score threshold.
    ZScore { score: u32 },
}

impl AnomalyScore {
    pub fn method(&self) -> AnomalyMethod {
        match self {
            Self::Forest { .. } => AnomalyMethod::Forest,
            Self::ZScore { .. } => AnomalyMethod::ZScore,
        }
    }
}

/// Anomaly verdict for one project, relative to the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub project_id: ProjectId,
    pub is_anomaly: bool,
    pub score: AnomalyScore,
}

impl AnomalyResult {
    pub fn method(&self) -> AnomalyMethod {
        self.score.method()
    }
}
