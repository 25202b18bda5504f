//! Configuration errors.

use super::error_code::{self, PulseErrorCode};

/// Why a configuration layer could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("Cannot read config file {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    /// A resolved value lies outside its accepted range. `field` is the
    /// dotted TOML key, e.g. `analysis.spi_threshold`.
    #[error("Config value {field} = {value} is out of range: {message}")]
    OutOfRange {
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("Config could not be serialized: {message}")]
    Serialize { message: String },
}

impl ConfigError {
    /// The offending key, for range errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::OutOfRange { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl PulseErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
