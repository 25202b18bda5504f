//! Current-index resolution and portfolio/project rollups.
//!
//! EVM indices aggregate sums, never per-task means: a portfolio of small
//! on-plan tasks and one large late task is late.

use chrono::NaiveDate;

use pulse_core::constants::NEUTRAL_INDEX;
use pulse_core::models::{
    CurrentMetrics, HistoryRecord, IndexSource, PortfolioDataset, PortfolioMetrics, Project,
    ProjectStatusMetrics, Task,
};
use pulse_core::types::collections::BTreeMap;
use pulse_core::types::ProjectId;

/// Divide, falling back to the neutral index for a zero denominator.
fn ratio_or_neutral(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        NEUTRAL_INDEX
    }
}

/// Compute current SPI/CPI from a project's tasks, falling back to the
/// latest history month, then to neutral.
///
/// `history` must be ordered oldest first, as [`PortfolioDataset`] stores it.
pub fn aggregate(tasks: &[Task], history: &[HistoryRecord]) -> CurrentMetrics {
    if tasks.is_empty() {
        return match history.last() {
            Some(latest) => CurrentMetrics {
                spi: latest.spi,
                cpi: latest.cpi,
                source: IndexSource::History,
                ..CurrentMetrics::neutral()
            },
            None => CurrentMetrics::neutral(),
        };
    }

    let (planned, actual, earned) = tasks.iter().fold((0.0, 0.0, 0.0), |(p, a, e), t| {
        (p + t.planned_cost, a + t.actual_cost, e + t.earned_value)
    });

    CurrentMetrics {
        spi: ratio_or_neutral(earned, planned),
        cpi: ratio_or_neutral(earned, actual),
        planned_cost: planned,
        earned_value: earned,
        actual_cost: Some(actual),
        progress: (planned > 0.0).then(|| (earned / planned).clamp(0.0, 1.0)),
        source: IndexSource::Tasks,
    }
}

/// Resolve a project's current indices.
///
/// Source order: tasks, then the project's reported spi/cpi, then the
/// latest history month, then 1.0. A reported index missing on one side
/// is filled from history (or neutral) independently.
pub fn resolve_current(project: &Project, tasks: &[Task], history: &[HistoryRecord]) -> CurrentMetrics {
    if !tasks.is_empty() || (project.spi.is_none() && project.cpi.is_none()) {
        return aggregate(tasks, history);
    }

    let latest = history.last();
    CurrentMetrics {
        spi: project
            .spi
            .or(latest.map(|h| h.spi))
            .unwrap_or(NEUTRAL_INDEX),
        cpi: project
            .cpi
            .or(latest.map(|h| h.cpi))
            .unwrap_or(NEUTRAL_INDEX),
        source: IndexSource::Project,
        ..CurrentMetrics::neutral()
    }
}

/// Latest reported indices per project: the most recent history month,
/// or neutral when a project has no history.
///
/// Attention ranking and portfolio insights read this, not
/// [`resolve_current`]; they report what projects last reported.
pub fn latest_indices(dataset: &PortfolioDataset) -> BTreeMap<ProjectId, CurrentMetrics> {
    dataset
        .projects()
        .iter()
        .map(|project| {
            let metrics = match dataset.history_for(&project.id).last() {
                Some(latest) => CurrentMetrics {
                    spi: latest.spi,
                    cpi: latest.cpi,
                    source: IndexSource::History,
                    ..CurrentMetrics::neutral()
                },
                None => CurrentMetrics::neutral(),
            };
            (project.id.clone(), metrics)
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Portfolio rollup from each project's latest history month.
///
/// Change is the latest mean minus the mean of every second-most-recent
/// month that exists (0 when no project has two months).
pub fn aggregate_portfolio(dataset: &PortfolioDataset) -> PortfolioMetrics {
    let mut latest_spi = Vec::new();
    let mut latest_cpi = Vec::new();
    let mut previous_spi = Vec::new();
    let mut previous_cpi = Vec::new();

    for project in dataset.projects() {
        let history = dataset.history_for(&project.id);
        if let Some(last) = history.last() {
            latest_spi.push(last.spi);
            latest_cpi.push(last.cpi);
        }
        if history.len() > 1 {
            let prev = &history[history.len() - 2];
            previous_spi.push(prev.spi);
            previous_cpi.push(prev.cpi);
        }
    }

    let avg_spi = mean(&latest_spi).unwrap_or(NEUTRAL_INDEX);
    let avg_cpi = mean(&latest_cpi).unwrap_or(NEUTRAL_INDEX);
    let spi_change = mean(&previous_spi).map_or(0.0, |prev| avg_spi - prev);
    let cpi_change = mean(&previous_cpi).map_or(0.0, |prev| avg_cpi - prev);

    let projects = dataset.projects();
    PortfolioMetrics {
        avg_spi,
        avg_cpi,
        spi_change,
        cpi_change,
        total_projects: projects.len(),
        active_projects: projects.iter().filter(|p| p.status.is_active()).count(),
        at_risk_projects: projects.iter().filter(|p| p.status.is_flagged()).count(),
        reporting_projects: latest_spi.len(),
    }
}

/// Dashboard snapshot for one project as of `today`.
pub fn project_status(
    project: &Project,
    tasks: &[Task],
    history: &[HistoryRecord],
    today: NaiveDate,
) -> ProjectStatusMetrics {
    let (latest_spi, latest_cpi, spi_change, cpi_change) = match history {
        [] => (NEUTRAL_INDEX, NEUTRAL_INDEX, 0.0, 0.0),
        [only] => (only.spi, only.cpi, 0.0, 0.0),
        [.., prev, last] => (last.spi, last.cpi, last.spi - prev.spi, last.cpi - prev.cpi),
    };

    let actual_cost: f64 = tasks.iter().map(|t| t.actual_cost).sum();
    let spend_percentage = actual_cost / project.budget * 100.0;

    let (schedule_progress, days_remaining) = match project.planned_window() {
        Some((start, end)) => {
            let total = (end - start).num_days();
            let passed = (today.min(end) - start).num_days();
            let progress = if total > 0 {
                (passed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
            } else if today >= start {
                100.0
            } else {
                0.0
            };
            (progress, (end - today).num_days().max(0))
        }
        None => (0.0, 0),
    };

    ProjectStatusMetrics {
        latest_spi,
        latest_cpi,
        spi_change,
        cpi_change,
        actual_cost,
        spend_percentage,
        schedule_progress,
        days_remaining,
    }
}
