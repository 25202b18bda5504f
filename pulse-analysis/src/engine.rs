//! Batch orchestration.
//!
//! The per-project stage (index resolution, EVM, trend, ensemble) runs in
//! parallel with rayon and is collected in input order. The anomaly stage
//! needs the whole batch, so it runs once after the join, followed by
//! attention ranking and insights.
//!
//! The engine is a pure function of `(dataset, config, now)`; the only
//! state that survives a call is the [`ForecastCache`] the caller chooses
//! to keep.

use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pulse_core::errors::{ForecastError, PulseErrorCode};
use pulse_core::models::{
    AnomalyResult, AttentionEntry, CurrentMetrics, ForecastModel, ForecastResult, HistoryRecord,
    PortfolioDataset, PortfolioMetrics, Project, ProjectStatusMetrics, SkippedProject, Task,
};
use pulse_core::tracing::events;
use pulse_core::types::collections::BTreeMap;
use pulse_core::types::ProjectId;
use pulse_core::PulseConfig;

use crate::anomaly::{self, AnomalySettings, MetricColumn, MetricMatrix};
use crate::attention::filter_attention;
use crate::cache::ForecastCache;
use crate::forecast::{blend, forecast_evm, EnsembleSettings};
use crate::insights::{portfolio_insights, project_insights};
use crate::metrics::{aggregate_portfolio, latest_indices, project_status, resolve_current};
use crate::trend::{fit_trend, mean_reversion_path, ProjectionPoint};

/// Counts for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub projects_forecast: usize,
    pub projects_skipped: usize,
    /// Forecasts whose completion date used the schedule trend.
    pub trend_forecasts: usize,
    pub anomalies_flagged: usize,
    pub attention_count: usize,
}

/// Everything one analysis pass produces. All per-project maps are keyed
/// by project id and serialize in id order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub generated_at: DateTime<Utc>,
    pub portfolio: PortfolioMetrics,
    /// Current indices and where they came from.
    pub current: BTreeMap<ProjectId, CurrentMetrics>,
    /// Dashboard status per project.
    pub metrics: BTreeMap<ProjectId, ProjectStatusMetrics>,
    pub forecasts: BTreeMap<ProjectId, ForecastResult>,
    /// Projects that produced no forecast, with the reason.
    pub skipped: BTreeMap<ProjectId, SkippedProject>,
    /// Mean-reversion series for presentation.
    pub projections: BTreeMap<ProjectId, Vec<ProjectionPoint>>,
    pub anomalies: BTreeMap<ProjectId, AnomalyResult>,
    /// Ranked, worst first.
    pub attention: Vec<AttentionEntry>,
    pub project_insights: BTreeMap<ProjectId, Vec<String>>,
    pub portfolio_insights: Vec<String>,
    pub summary: RunSummary,
}

impl PortfolioAnalysis {
    /// An analysis of an empty portfolio.
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            portfolio: aggregate_portfolio(&PortfolioDataset::default()),
            current: BTreeMap::new(),
            metrics: BTreeMap::new(),
            forecasts: BTreeMap::new(),
            skipped: BTreeMap::new(),
            projections: BTreeMap::new(),
            anomalies: BTreeMap::new(),
            attention: Vec::new(),
            project_insights: BTreeMap::new(),
            portfolio_insights: Vec::new(),
            summary: RunSummary::default(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Output of the per-project stage.
struct ProjectOutcome {
    id: ProjectId,
    current: CurrentMetrics,
    status: ProjectStatusMetrics,
    forecast: Result<ForecastResult, ForecastError>,
    projection: Vec<ProjectionPoint>,
    insights: Vec<String>,
}

/// Portfolio forecasting engine.
#[derive(Debug, Clone)]
pub struct PortfolioEngine {
    config: PulseConfig,
    ensemble: EnsembleSettings,
    anomaly: AnomalySettings,
    columns: Vec<MetricColumn>,
}

impl PortfolioEngine {
    pub fn new(config: PulseConfig) -> Self {
        let ensemble = EnsembleSettings::from_config(&config);
        let anomaly = AnomalySettings::from_config(&config.anomaly);
        let columns = MetricColumn::resolve(&config.anomaly.metrics);
        Self {
            config,
            ensemble,
            anomaly,
            columns,
        }
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    /// Forecast one project: resolve indices, extrapolate with EVM, and
    /// blend in the trend projection when the history supports one.
    pub fn forecast_project(
        &self,
        project: &Project,
        tasks: &[Task],
        history: &[HistoryRecord],
        today: NaiveDate,
    ) -> Result<ForecastResult, ForecastError> {
        let current = resolve_current(project, tasks, history);
        self.forecast_with(project, &current, history, today)
    }

    fn forecast_with(
        &self,
        project: &Project,
        current: &CurrentMetrics,
        history: &[HistoryRecord],
        today: NaiveDate,
    ) -> Result<ForecastResult, ForecastError> {
        let point = forecast_evm(project, current, today)?;

        let trend = match fit_trend(
            history,
            self.config.analysis.effective_forecast_horizon(),
            self.config.forecast.effective_min_history_points(),
        ) {
            Ok(model) => Some(model),
            Err(e) => {
                debug!(project_id = %project.id, code = e.error_code(), reason = %e, "trend model not used");
                None
            }
        };

        blend(&point, trend.as_ref(), project, history, &self.ensemble)
    }

    fn run_project(&self, dataset: &PortfolioDataset, project: &Project, today: NaiveDate) -> ProjectOutcome {
        let tasks = dataset.tasks_for(&project.id);
        let history = dataset.history_for(&project.id);
        let current = resolve_current(project, tasks, history);

        ProjectOutcome {
            id: project.id.clone(),
            current,
            status: project_status(project, tasks, history, today),
            forecast: self.forecast_with(project, &current, history, today),
            projection: mean_reversion_path(history, self.config.analysis.effective_forecast_horizon()),
            insights: project_insights(
                project,
                &current,
                today,
                self.config.forecast.effective_high_risk_count(),
            ),
        }
    }

    fn matrix_row(&self, project: &Project, outcome: &ProjectOutcome) -> Vec<Option<f64>> {
        let forecast = outcome.forecast.as_ref().ok();
        self.columns
            .iter()
            .map(|column| match column {
                MetricColumn::Spi => Some(forecast.map_or(outcome.current.spi, |f| f.spi_used)),
                MetricColumn::Cpi => Some(forecast.map_or(outcome.current.cpi, |f| f.cpi_used)),
                MetricColumn::BudgetVariancePct => forecast.map(|f| f.budget_variance_pct(project.budget)),
                MetricColumn::ScheduleVarianceDays => forecast.map(|f| f.schedule_variance_days as f64),
            })
            .collect()
    }

    /// Run the full analysis as of `now`.
    pub fn analyze(&self, dataset: &PortfolioDataset, now: DateTime<Utc>) -> PortfolioAnalysis {
        let started = Instant::now();
        let today = now.date_naive();
        let projects = dataset.projects();

        info!(projects = projects.len(), %today, "starting portfolio analysis");

        let outcomes: Vec<ProjectOutcome> = projects
            .par_iter()
            .map(|project| self.run_project(dataset, project, today))
            .collect();

        let mut matrix = MetricMatrix::new(self.columns.clone());
        for (project, outcome) in projects.iter().zip(&outcomes) {
            matrix.push_row(project.id.clone(), self.matrix_row(project, outcome));
        }
        let anomalies = anomaly::detect_with(&matrix, &self.anomaly);

        let mut analysis = PortfolioAnalysis::empty(now);
        analysis.portfolio = aggregate_portfolio(dataset);
        for outcome in outcomes {
            let id = outcome.id;
            match outcome.forecast {
                Ok(forecast) => {
                    analysis.forecasts.insert(id.clone(), forecast);
                }
                Err(e) => {
                    let skipped = SkippedProject::from_error(id.clone(), &e);
                    events::project_skipped(id.as_str(), &skipped.code, &skipped.reason);
                    analysis.skipped.insert(id.clone(), skipped);
                }
            }
            analysis.current.insert(id.clone(), outcome.current);
            analysis.metrics.insert(id.clone(), outcome.status);
            if !outcome.projection.is_empty() {
                analysis.projections.insert(id.clone(), outcome.projection);
            }
            analysis.project_insights.insert(id, outcome.insights);
        }

        // Attention and portfolio narrative rank on what projects last
        // reported, not on the task-derived indices used for forecasting.
        let latest = latest_indices(dataset);
        analysis.attention = filter_attention(
            projects,
            &latest,
            self.config.analysis.effective_spi_threshold(),
            self.config.analysis.effective_cpi_threshold(),
        );
        analysis.portfolio_insights = portfolio_insights(&analysis.portfolio, &latest, &anomalies);
        analysis.anomalies = anomalies;

        analysis.summary = RunSummary {
            projects_forecast: analysis.forecasts.len(),
            projects_skipped: analysis.skipped.len(),
            trend_forecasts: analysis
                .forecasts
                .values()
                .filter(|f| f.used(ForecastModel::ScheduleTrend))
                .count(),
            anomalies_flagged: analysis.anomalies.values().filter(|a| a.is_anomaly).count(),
            attention_count: analysis.attention.len(),
        };

        let s = &analysis.summary;
        events::batch_completed(
            s.projects_forecast,
            s.projects_skipped,
            s.anomalies_flagged,
            s.attention_count,
            started.elapsed().as_millis() as u64,
        );
        analysis
    }

    /// Reuse `cache` if it is still fresh at `now`; otherwise run a new
    /// analysis and return it stamped with `now`.
    pub fn analyze_cached(
        &self,
        dataset: &PortfolioDataset,
        now: DateTime<Utc>,
        cache: Option<ForecastCache>,
    ) -> ForecastCache {
        if let Some(cache) = cache {
            let hit = cache.is_fresh(now);
            events::cache_checked(hit, cache.age_secs(now));
            if hit {
                return cache;
            }
        }
        let analysis = self.analyze(dataset, now);
        ForecastCache::new(analysis, now, self.config.forecast.effective_cache_validity_secs())
    }
}

impl Default for PortfolioEngine {
    fn default() -> Self {
        Self::new(PulseConfig::default())
    }
}
