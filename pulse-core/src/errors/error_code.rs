//! PulseErrorCode trait for collaborators that cannot carry typed errors.

/// Every error enum implements this to provide a stable code string
/// that presentation and export layers can match on.
pub trait PulseErrorCode {
    /// Returns the error code string (e.g., "INGEST_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const INGEST_ERROR: &str = "INGEST_ERROR";
pub const MISSING_DATA: &str = "MISSING_DATA";
pub const DEGENERATE_INPUT: &str = "DEGENERATE_INPUT";
pub const TREND_UNAVAILABLE: &str = "TREND_UNAVAILABLE";
