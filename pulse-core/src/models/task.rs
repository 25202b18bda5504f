//! Task record.

use serde::{Deserialize, Serialize};

use crate::types::{ProjectId, TaskId};

/// A validated task. All costs are finite and >= 0.
///
/// `earned_value <= planned_cost` is expected but not enforced; source data
/// may violate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub planned_cost: f64,
    pub actual_cost: f64,
    pub earned_value: f64,
}

impl Task {
    pub fn new(
        id: impl Into<TaskId>,
        project_id: impl Into<ProjectId>,
        planned_cost: f64,
        actual_cost: f64,
        earned_value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            planned_cost,
            actual_cost,
            earned_value,
        }
    }
}
