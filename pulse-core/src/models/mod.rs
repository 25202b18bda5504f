//! Validated data contracts shared by every engine stage.

pub mod anomaly;
pub mod attention;
pub mod dataset;
pub mod forecast;
pub mod history;
pub mod metrics;
pub mod project;
pub mod task;

pub use anomaly::{AnomalyMethod, AnomalyResult, AnomalyScore};
pub use attention::{AttentionEntry, AttentionReason};
pub use dataset::PortfolioDataset;
pub use forecast::{ForecastModel, ForecastResult, SkippedProject};
pub use history::HistoryRecord;
pub use metrics::{CurrentMetrics, IndexSource, PortfolioMetrics, ProjectStatusMetrics};
pub use project::{Project, ProjectStatus};
pub use task::Task;
