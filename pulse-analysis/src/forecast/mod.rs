//! Per-project forecasting: closed-form EVM extrapolation and the
//! trend-weighted ensemble built on top of it.

pub mod ensemble;
pub mod evm;

pub use ensemble::{blend, EnsembleSettings};
pub use evm::{forecast_evm, PointForecast};
