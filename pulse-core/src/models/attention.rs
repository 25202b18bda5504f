//! Attention list entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::collections::SmallVec3;
use crate::types::ProjectId;

use super::ProjectStatus;

/// Why a project made the attention list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionReason {
    ScheduleBelowThreshold,
    CostBelowThreshold,
    StatusFlagged,
}

impl AttentionReason {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScheduleBelowThreshold => "schedule_below_threshold",
            Self::CostBelowThreshold => "cost_below_threshold",
            Self::StatusFlagged => "status_flagged",
        }
    }
}

impl fmt::Display for AttentionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One ranked project on the attention list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionEntry {
    pub project_id: ProjectId,
    pub status: ProjectStatus,
    pub spi: f64,
    pub cpi: f64,
    /// `0.5*(1-spi) + 0.5*(1-cpi)`; higher is worse.
    pub risk_score: f64,
    pub reasons: SmallVec3<AttentionReason>,
}
