//! Error handling for Pulse.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod forecast_error;
pub mod ingest_error;
pub mod pipeline_error;
pub mod trend_error;

pub use config_error::ConfigError;
pub use error_code::PulseErrorCode;
pub use forecast_error::ForecastError;
pub use ingest_error::IngestError;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use trend_error::TrendError;
