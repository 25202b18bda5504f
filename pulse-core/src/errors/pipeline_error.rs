//! Pipeline errors and non-fatal error collection.

use super::error_code::PulseErrorCode;
use super::{ConfigError, ForecastError, IngestError};

/// Errors that can occur during a batch run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PulseErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Ingest(e) => e.error_code(),
            Self::Forecast(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}

/// Result of a batch step that accumulates non-fatal errors.
/// Partial results are returned even when some records fail.
#[derive(Debug, Default)]
pub struct PipelineResult<T: Default = ()> {
    /// The successful result data.
    pub data: T,
    /// Non-fatal errors collected during the run.
    pub errors: Vec<PipelineError>,
}

impl<T: Default> PipelineResult<T> {
    /// Create a new pipeline result with no errors.
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    /// Add a non-fatal error to the result.
    pub fn add_error(&mut self, error: impl Into<PipelineError>) {
        self.errors.push(error.into());
    }

    /// Returns true if there are no non-fatal errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of non-fatal errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
