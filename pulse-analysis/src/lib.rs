//! # pulse-analysis
//!
//! The forecasting engine. Per project: current-index resolution, EVM
//! extrapolation, trend regression, and ensemble blending. Across the
//! batch: anomaly scoring, attention ranking, and narrative insights.
//!
//! [`engine::PortfolioEngine`] ties the stages together; every stage is
//! also usable on its own.

pub mod anomaly;
pub mod attention;
pub mod cache;
pub mod engine;
pub mod forecast;
pub mod insights;
pub mod metrics;
pub mod rng;
pub mod simulation;
pub mod trend;

pub use cache::ForecastCache;
pub use engine::{PortfolioAnalysis, PortfolioEngine};
