//! Configuration system for Pulse.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod analysis_config;
pub mod anomaly_config;
pub mod forecast_config;
pub mod pulse_config;
pub mod simulation_config;

pub use analysis_config::AnalysisConfig;
pub use anomaly_config::AnomalyConfig;
pub use forecast_config::ForecastConfig;
pub use pulse_config::{CliOverrides, PulseConfig};
pub use simulation_config::SimulationConfig;
