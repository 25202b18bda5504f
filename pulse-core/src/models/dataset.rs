//! The validated, in-memory input to one analysis pass.

use crate::types::collections::FxHashMap;
use crate::types::ProjectId;

use super::{HistoryRecord, Project, Task};

/// Projects with their tasks and month-ordered history.
///
/// Only constructed through [`PortfolioDataset::ingest`] or
/// [`PortfolioDataset::from_records`], so every invariant checked at the
/// boundary holds for the engine.
#[derive(Debug, Clone, Default)]
pub struct PortfolioDataset {
    projects: Vec<Project>,
    tasks: FxHashMap<ProjectId, Vec<Task>>,
    history: FxHashMap<ProjectId, Vec<HistoryRecord>>,
}

impl PortfolioDataset {
    /// Assemble from already-validated parts. History is sorted by month here.
    pub(crate) fn from_parts(
        projects: Vec<Project>,
        tasks: FxHashMap<ProjectId, Vec<Task>>,
        mut history: FxHashMap<ProjectId, Vec<HistoryRecord>>,
    ) -> Self {
        for series in history.values_mut() {
            series.sort_by_key(|r| r.month);
        }
        Self {
            projects,
            tasks,
            history,
        }
    }

    /// Projects in input order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    pub fn tasks_for(&self, id: &ProjectId) -> &[Task] {
        self.tasks.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// History for one project, oldest month first.
    pub fn history_for(&self, id: &ProjectId) -> &[HistoryRecord] {
        self.history.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.values().map(Vec::len).sum()
    }

    pub fn history_count(&self) -> usize {
        self.history.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
