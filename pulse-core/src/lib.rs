//! # pulse-core
//!
//! Data contracts, boundary validation, errors, configuration, and tracing
//! for the Pulse portfolio forecasting engine.
//!
//! Collaborators hand raw records to [`ingest`]; everything downstream works
//! on the validated types in [`models`], where optional fields are explicit
//! and required fields are guaranteed present.

pub mod config;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod models;
pub mod tracing;
pub mod types;

pub use config::PulseConfig;
pub use errors::{PipelineError, PipelineResult};
pub use models::PortfolioDataset;
