//! Boundary validation for collaborator-supplied records.
//!
//! Raw records arrive loosely typed (strings for dates, months, and status;
//! optional everything). They are validated exactly once here. Rejected
//! records are reported as non-fatal [`IngestError`]s and dropped; the rest
//! of the dataset is still usable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{IngestError, PipelineResult};
use crate::models::{HistoryRecord, PortfolioDataset, Project, ProjectStatus, Task};
use crate::types::collections::{FxHashMap, FxHashSet};
use crate::types::{MonthKey, ProjectId};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A project row as a collaborator supplies it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProject {
    pub id: String,
    pub name: Option<String>,
    pub budget: f64,
    pub planned_start: Option<String>,
    pub planned_end: Option<String>,
    pub status: String,
    pub spi: Option<f64>,
    pub cpi: Option<f64>,
    pub actual_cost: Option<f64>,
    pub completion_pct: Option<f64>,
    pub risk_count: Option<u32>,
}

/// A task row as a collaborator supplies it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTask {
    pub id: String,
    pub project_id: String,
    pub planned_cost: f64,
    pub actual_cost: f64,
    pub earned_value: f64,
}

/// A history row as a collaborator supplies it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHistoryRecord {
    pub project_id: String,
    pub month: String,
    pub spi: f64,
    pub cpi: f64,
}

/// The three input tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDataset {
    pub projects: Vec<RawProject>,
    pub tasks: Vec<RawTask>,
    pub history: Vec<RawHistoryRecord>,
}

impl PortfolioDataset {
    /// Parse a JSON document shaped like [`RawDataset`] and ingest it.
    ///
    /// Malformed JSON is the one fatal case: there is nothing to ingest.
    pub fn from_json(json: &str) -> Result<PipelineResult<PortfolioDataset>, IngestError> {
        let raw: RawDataset = serde_json::from_str(json)?;
        Ok(Self::ingest(raw))
    }

    /// Convert raw collaborator tables into a validated dataset.
    pub fn ingest(raw: RawDataset) -> PipelineResult<PortfolioDataset> {
        let mut errors = Vec::new();

        let projects: Vec<Project> = raw
            .projects
            .into_iter()
            .filter_map(|p| convert_project(p).map_err(|e| errors.push(e)).ok())
            .collect();

        let tasks: Vec<Task> = raw
            .tasks
            .into_iter()
            .map(|t| Task::new(t.id, t.project_id, t.planned_cost, t.actual_cost, t.earned_value))
            .collect();

        let history: Vec<HistoryRecord> = raw
            .history
            .into_iter()
            .filter_map(|h| match h.month.parse::<MonthKey>() {
                Ok(month) => Some(HistoryRecord::new(h.project_id, month, h.spi, h.cpi)),
                Err(_) => {
                    errors.push(IngestError::InvalidMonth {
                        project_id: h.project_id,
                        value: h.month,
                    });
                    None
                }
            })
            .collect();

        let mut result = Self::from_records(projects, tasks, history);
        for error in errors {
            result.add_error(error);
        }
        result
    }

    /// Validate typed records and assemble a dataset.
    ///
    /// Checks: unique non-empty project ids, budget > 0, planned end not
    /// before planned start, task and history foreign keys, finite
    /// non-negative task costs, and one history record per project-month
    /// (first wins).
    pub fn from_records(
        projects: Vec<Project>,
        tasks: Vec<Task>,
        history: Vec<HistoryRecord>,
    ) -> PipelineResult<PortfolioDataset> {
        let mut errors: Vec<IngestError> = Vec::new();

        let mut seen: FxHashSet<ProjectId> = FxHashSet::default();
        let mut accepted = Vec::with_capacity(projects.len());
        for project in projects {
            match validate_project(&project, &seen) {
                Ok(()) => {
                    seen.insert(project.id.clone());
                    accepted.push(project);
                }
                Err(e) => errors.push(e),
            }
        }

        let mut tasks_by_project: FxHashMap<ProjectId, Vec<Task>> = FxHashMap::default();
        for task in tasks {
            if let Err(e) = validate_task(&task, &seen) {
                errors.push(e);
                continue;
            }
            if task.earned_value > task.planned_cost {
                tracing::debug!(
                    task_id = %task.id,
                    earned_value = task.earned_value,
                    planned_cost = task.planned_cost,
                    "earned value exceeds planned cost; accepted as advisory"
                );
            }
            tasks_by_project
                .entry(task.project_id.clone())
                .or_default()
                .push(task);
        }

        let mut months_seen: FxHashSet<(ProjectId, MonthKey)> = FxHashSet::default();
        let mut history_by_project: FxHashMap<ProjectId, Vec<HistoryRecord>> =
            FxHashMap::default();
        for record in history {
            if !seen.contains(&record.project_id) {
                errors.push(IngestError::UnknownProject {
                    record: "History record",
                    project_id: record.project_id.to_string(),
                });
                continue;
            }
            if !months_seen.insert((record.project_id.clone(), record.month)) {
                errors.push(IngestError::DuplicateMonth {
                    project_id: record.project_id.to_string(),
                    month: record.month.to_string(),
                });
                continue;
            }
            history_by_project
                .entry(record.project_id.clone())
                .or_default()
                .push(record);
        }

        let dataset = PortfolioDataset::from_parts(accepted, tasks_by_project, history_by_project);
        tracing::debug!(
            projects = dataset.projects().len(),
            tasks = dataset.task_count(),
            history = dataset.history_count(),
            rejected = errors.len(),
            "dataset ingested"
        );

        let mut result = PipelineResult::new(dataset);
        for error in errors {
            result.add_error(error);
        }
        result
    }
}

fn convert_project(raw: RawProject) -> Result<Project, IngestError> {
    let planned_start = parse_date(&raw.id, "planned_start", raw.planned_start.as_deref())?;
    let planned_end = parse_date(&raw.id, "planned_end", raw.planned_end.as_deref())?;
    let status = raw
        .status
        .parse::<ProjectStatus>()
        .map_err(|value| IngestError::UnknownStatus {
            project_id: raw.id.clone(),
            value,
        })?;

    Ok(Project {
        id: ProjectId::new(raw.id),
        name: raw.name.filter(|n| !n.trim().is_empty()),
        budget: raw.budget,
        planned_start,
        planned_end,
        status,
        spi: raw.spi,
        cpi: raw.cpi,
        actual_cost: raw.actual_cost.filter(|c| c.is_finite() && *c >= 0.0),
        completion_pct: raw
            .completion_pct
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 100.0)),
        risk_count: raw.risk_count,
    })
}

fn parse_date(
    project_id: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, IngestError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => {
            // Accept a trailing time component ("2024-01-01T00:00:00").
            let date_part = v.get(..10).unwrap_or(v);
            NaiveDate::parse_from_str(date_part, DATE_FORMAT)
                .map(Some)
                .map_err(|_| IngestError::InvalidDate {
                    project_id: project_id.to_string(),
                    field,
                    value: v.to_string(),
                })
        }
    }
}

fn validate_project(project: &Project, seen: &FxHashSet<ProjectId>) -> Result<(), IngestError> {
    if project.id.as_str().trim().is_empty() {
        return Err(IngestError::EmptyProjectId);
    }
    if seen.contains(&project.id) {
        return Err(IngestError::DuplicateProject {
            project_id: project.id.to_string(),
        });
    }
    if !project.budget.is_finite() || project.budget <= 0.0 {
        return Err(IngestError::InvalidBudget {
            project_id: project.id.to_string(),
            budget: project.budget,
        });
    }
    if let Some((start, end)) = project.planned_window() {
        if end < start {
            return Err(IngestError::InvalidDateRange {
                project_id: project.id.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        if end == start {
            tracing::debug!(project_id = %project.id, "zero-length planned window accepted");
        }
    }
    Ok(())
}

fn validate_task(task: &Task, projects: &FxHashSet<ProjectId>) -> Result<(), IngestError> {
    if !projects.contains(&task.project_id) {
        return Err(IngestError::UnknownProject {
            record: "Task",
            project_id: task.project_id.to_string(),
        });
    }
    for (field, value) in [
        ("planned_cost", task.planned_cost),
        ("actual_cost", task.actual_cost),
        ("earned_value", task.earned_value),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(IngestError::InvalidCost {
                task_id: task.id.to_string(),
                field,
                value,
            });
        }
    }
    Ok(())
}
