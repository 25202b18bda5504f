//! Per-project forecast errors. None of these abort a batch.

use super::error_code::{self, PulseErrorCode};

/// Why a single project could not be forecast.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("Project {project_id} has no planned start/end dates")]
    MissingPlannedDates { project_id: String },

    #[error("Forecast for project {project_id} produced a non-finite {field}")]
    NonFinite {
        project_id: String,
        field: &'static str,
    },

    #[error("Forecast for project {project_id} falls outside the representable date range")]
    DateOutOfRange { project_id: String },
}

impl PulseErrorCode for ForecastError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPlannedDates { .. } => error_code::MISSING_DATA,
            Self::NonFinite { .. } | Self::DateOutOfRange { .. } => error_code::DEGENERATE_INPUT,
        }
    }
}
