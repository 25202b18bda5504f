//! Top-level Pulse configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AnalysisConfig, AnomalyConfig, ForecastConfig, SimulationConfig};
use crate::constants;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`PULSE_*`)
/// 3. Project config (`pulse.toml` in the given root)
/// 4. User config (`~/.pulse/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PulseConfig {
    pub analysis: AnalysisConfig,
    pub anomaly: AnomalyConfig,
    pub forecast: ForecastConfig,
    pub simulation: SimulationConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub spi_threshold: Option<f64>,
    pub cpi_threshold: Option<f64>,
    pub forecast_horizon_months: Option<u32>,
    pub anomaly_contamination: Option<f64>,
}

impl PulseConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join("pulse.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values against the documented input ranges.
    pub fn validate(config: &PulseConfig) -> Result<(), ConfigError> {
        let (lo, hi) = constants::THRESHOLD_RANGE;
        for (field, value) in [
            ("analysis.spi_threshold", config.analysis.spi_threshold),
            ("analysis.cpi_threshold", config.analysis.cpi_threshold),
        ] {
            if let Some(v) = value.filter(|v| !(lo..=hi).contains(v)) {
                return Err(out_of_range(field, v, format!("must be between {lo} and {hi}")));
            }
        }

        let (lo, hi) = constants::FORECAST_HORIZON_RANGE;
        if let Some(h) = config
            .analysis
            .forecast_horizon_months
            .filter(|h| !(lo..=hi).contains(h))
        {
            return Err(out_of_range(
                "analysis.forecast_horizon_months",
                h,
                format!("must be between {lo} and {hi}"),
            ));
        }

        let (lo, hi) = constants::CONTAMINATION_RANGE;
        if let Some(c) = config.anomaly.contamination.filter(|c| !(lo..=hi).contains(c)) {
            return Err(out_of_range(
                "anomaly.contamination",
                c,
                format!("must be between {lo} and {hi}"),
            ));
        }

        if let Some(z) = config.anomaly.zscore_threshold.filter(|z| !z.is_finite() || *z <= 0.0) {
            return Err(out_of_range("anomaly.zscore_threshold", z, "must be > 0".to_string()));
        }

        if let Some(w) = config.forecast.trend_weight.filter(|w| !(0.0..=1.0).contains(w)) {
            return Err(out_of_range(
                "forecast.trend_weight",
                w,
                "must be between 0.0 and 1.0".to_string(),
            ));
        }

        for (field, value) in [
            ("forecast.confidence_with_trend", config.forecast.confidence_with_trend),
            ("forecast.confidence_evm_only", config.forecast.confidence_evm_only),
        ] {
            if let Some(v) = value.filter(|v| *v > 100) {
                return Err(out_of_range(field, v, "must be between 0 and 100".to_string()));
            }
        }

        if let Some(v) = config
            .simulation
            .spi_volatility
            .filter(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(out_of_range("simulation.spi_volatility", v, "must be >= 0".to_string()));
        }

        Ok(())
    }

    /// Returns the user config path: `~/.pulse/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".pulse").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut PulseConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let file_config: PulseConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a value.
    fn merge(base: &mut PulseConfig, other: &PulseConfig) {
        macro_rules! take {
            ($section:ident . $field:ident) => {
                if other.$section.$field.is_some() {
                    base.$section.$field = other.$section.$field;
                }
            };
        }

        // Analysis
        take!(analysis.spi_threshold);
        take!(analysis.cpi_threshold);
        take!(analysis.forecast_horizon_months);

        // Anomaly
        take!(anomaly.contamination);
        take!(anomaly.seed);
        take!(anomaly.n_estimators);
        take!(anomaly.max_samples);
        take!(anomaly.min_forest_rows);
        take!(anomaly.zscore_threshold);
        if !other.anomaly.metrics.is_empty() {
            base.anomaly.metrics = other.anomaly.metrics.clone();
        }

        // Forecast
        take!(forecast.trend_weight);
        take!(forecast.confidence_with_trend);
        take!(forecast.confidence_evm_only);
        take!(forecast.min_history_points);
        take!(forecast.cache_validity_secs);
        take!(forecast.high_risk_count);

        // Simulation
        take!(simulation.iterations);
        take!(simulation.seed);
        take!(simulation.spi_volatility);
    }

    /// Apply environment variable overrides.
    /// Unparseable values are ignored.
    fn apply_env_overrides(config: &mut PulseConfig) {
        if let Some(v) = env_parse::<f64>("PULSE_SPI_THRESHOLD") {
            config.analysis.spi_threshold = Some(v);
        }
        if let Some(v) = env_parse::<f64>("PULSE_CPI_THRESHOLD") {
            config.analysis.cpi_threshold = Some(v);
        }
        if let Some(v) = env_parse::<u32>("PULSE_FORECAST_HORIZON") {
            config.analysis.forecast_horizon_months = Some(v);
        }
        if let Some(v) = env_parse::<f64>("PULSE_ANOMALY_CONTAMINATION") {
            config.anomaly.contamination = Some(v);
        }
        if let Some(v) = env_parse::<u64>("PULSE_ANOMALY_SEED") {
            config.anomaly.seed = Some(v);
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut PulseConfig, cli: &CliOverrides) {
        if let Some(v) = cli.spi_threshold {
            config.analysis.spi_threshold = Some(v);
        }
        if let Some(v) = cli.cpi_threshold {
            config.analysis.cpi_threshold = Some(v);
        }
        if let Some(v) = cli.forecast_horizon_months {
            config.analysis.forecast_horizon_months = Some(v);
        }
        if let Some(v) = cli.anomaly_contamination {
            config.anomaly.contamination = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }
}

fn out_of_range(field: &'static str, value: impl std::fmt::Display, message: String) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        value: value.to_string(),
        message,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
