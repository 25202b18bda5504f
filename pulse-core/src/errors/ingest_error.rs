//! Boundary validation errors raised while ingesting collaborator records.

use super::error_code::{self, PulseErrorCode};

/// A record rejected at ingestion. Rejections are non-fatal: the record is
/// dropped and the rest of the dataset is still ingested.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestError {
    #[error("Project record has an empty id")]
    EmptyProjectId,

    #[error("Duplicate project id {project_id}")]
    DuplicateProject { project_id: String },

    #[error("Project {project_id} has invalid budget {budget} (must be > 0)")]
    InvalidBudget { project_id: String, budget: f64 },

    #[error("Project {project_id} has invalid {field} '{value}' (expected YYYY-MM-DD)")]
    InvalidDate {
        project_id: String,
        field: &'static str,
        value: String,
    },

    #[error("Project {project_id} ends ({end}) before it starts ({start})")]
    InvalidDateRange {
        project_id: String,
        start: String,
        end: String,
    },

    #[error("Project {project_id} has unknown status '{value}'")]
    UnknownStatus { project_id: String, value: String },

    #[error("{record} references unknown project {project_id}")]
    UnknownProject {
        record: &'static str,
        project_id: String,
    },

    #[error("Task {task_id} has invalid {field} {value} (must be finite and >= 0)")]
    InvalidCost {
        task_id: String,
        field: &'static str,
        value: f64,
    },

    #[error("History for project {project_id} has invalid month '{value}' (expected YYYY-MM)")]
    InvalidMonth { project_id: String, value: String },

    #[error("Duplicate history month {month} for project {project_id}")]
    DuplicateMonth { project_id: String, month: String },

    #[error("Dataset JSON could not be parsed: {message}")]
    Json { message: String },
}

impl PulseErrorCode for IngestError {
    fn error_code(&self) -> &'static str {
        error_code::INGEST_ERROR
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json {
            message: e.to_string(),
        }
    }
}
