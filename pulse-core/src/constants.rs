//! Shared constants for the Pulse forecasting engine.

/// Pulse version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Index value assumed when a project reports no SPI/CPI at all.
pub const NEUTRAL_INDEX: f64 = 1.0;

// ---- Attention / thresholds ----

/// Default SPI threshold below which a project needs attention.
pub const DEFAULT_SPI_THRESHOLD: f64 = 0.9;

/// Default CPI threshold below which a project needs attention.
pub const DEFAULT_CPI_THRESHOLD: f64 = 0.9;

/// Distance below a threshold at which a shortfall becomes "significant".
pub const SIGNIFICANT_SHORTFALL_MARGIN: f64 = 0.1;

/// Allowed range for SPI/CPI thresholds.
pub const THRESHOLD_RANGE: (f64, f64) = (0.7, 1.0);

// ---- Forecasting ----

/// Default trend projection horizon in months.
pub const DEFAULT_FORECAST_HORIZON_MONTHS: u32 = 3;

/// Allowed range for the forecast horizon.
pub const FORECAST_HORIZON_RANGE: (u32, u32) = (1, 12);

/// Minimum history points before a trend line is fitted.
pub const DEFAULT_MIN_HISTORY_POINTS: usize = 3;

/// Weight of the trend projection when blended with the EVM forecast.
pub const DEFAULT_TREND_WEIGHT: f64 = 0.75;

/// Confidence reported when a usable trend projection took part.
pub const DEFAULT_CONFIDENCE_WITH_TREND: u8 = 80;

/// Confidence reported for EVM-only forecasts.
pub const DEFAULT_CONFIDENCE_EVM_ONLY: u8 = 60;

/// Completion-date buffer as a fraction of the planned duration.
pub const COMPLETION_BUFFER_FRACTION: f64 = 0.15;

/// Best-case final cost multiplier.
pub const COST_BEST_FACTOR: f64 = 0.95;

/// Worst-case final cost multiplier.
pub const COST_WORST_FACTOR: f64 = 1.20;

/// EAC multiplier used when CPI is zero or invalid.
pub const DEGENERATE_CPI_COST_FACTOR: f64 = 1.5;

/// Completion fraction assumed when neither actual cost nor progress is known.
pub const DEFAULT_COMPLETION_FRACTION: f64 = 0.5;

/// Delay (days) above which a delay is significant.
pub const SIGNIFICANT_DELAY_DAYS: i64 = 30;

/// Delay (days) above which a delay is moderate.
pub const MODERATE_DELAY_DAYS: i64 = 10;

/// Cost overrun (%) above which an overrun is significant.
pub const SIGNIFICANT_OVERRUN_PCT: f64 = 20.0;

/// Cost overrun (%) above which an overrun is moderate.
pub const MODERATE_OVERRUN_PCT: f64 = 10.0;

/// Open-risk count above which a project is flagged.
pub const DEFAULT_HIGH_RISK_COUNT: u32 = 5;

/// Forecast cache validity window in seconds.
pub const DEFAULT_CACHE_VALIDITY_SECS: u64 = 3600;

// ---- Anomaly detection ----

/// Default expected outlier fraction.
pub const DEFAULT_CONTAMINATION: f64 = 0.1;

/// Allowed range for contamination.
pub const CONTAMINATION_RANGE: (f64, f64) = (0.0, 0.5);

/// Default seed for the isolation forest.
pub const DEFAULT_ANOMALY_SEED: u64 = 42;

/// Default number of isolation trees.
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Default subsample size per isolation tree.
pub const DEFAULT_MAX_SAMPLES: usize = 256;

/// Row count at which the isolation forest replaces the z-score fallback.
pub const DEFAULT_MIN_FOREST_ROWS: usize = 10;

/// Standard deviations beyond which the fallback flags a cell.
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;

// ---- Simulation ----

/// Default Monte Carlo iteration count.
pub const DEFAULT_SIMULATION_ITERATIONS: u32 = 1000;

/// Default Monte Carlo seed.
pub const DEFAULT_SIMULATION_SEED: u64 = 42;

/// SPI spread used when history is too short to estimate one.
pub const DEFAULT_SPI_VOLATILITY: f64 = 0.05;
