//! Narrative insights from fixed severity bands.
//!
//! Pure mappings from metrics to sentences; nothing here is learned.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pulse_core::models::{AnomalyResult, CurrentMetrics, PortfolioMetrics, Project};
use pulse_core::types::collections::BTreeMap;
use pulse_core::types::ProjectId;

/// Severity band for a performance index. Boundaries belong to the higher
/// band: exactly 1.1 is `Excellent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Critical,
    Concerning,
    Acceptable,
    Good,
    Excellent,
}

impl PerformanceBand {
    pub fn from_index(value: f64) -> Self {
        if value >= 1.1 {
            Self::Excellent
        } else if value >= 1.0 {
            Self::Good
        } else if value >= 0.9 {
            Self::Acceptable
        } else if value >= 0.8 {
            Self::Concerning
        } else {
            Self::Critical
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Concerning => "concerning",
            Self::Acceptable => "acceptable",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

fn schedule_sentence(spi: f64) -> String {
    let band = PerformanceBand::from_index(spi);
    let tail = match band {
        PerformanceBand::Excellent => "significantly ahead of plan",
        PerformanceBand::Good => "slightly ahead of plan",
        PerformanceBand::Acceptable => "but monitor for potential delays",
        PerformanceBand::Concerning => "consider corrective actions",
        PerformanceBand::Critical => "immediate intervention required",
    };
    format!("Schedule performance is {} at {spi:.2}, {tail}.", band.name())
}

fn cost_sentence(cpi: f64) -> String {
    let band = PerformanceBand::from_index(cpi);
    let tail = match band {
        PerformanceBand::Excellent => "significantly under budget",
        PerformanceBand::Good => "slightly under budget",
        PerformanceBand::Acceptable => "but monitor for potential overruns",
        PerformanceBand::Concerning => "consider cost control measures",
        PerformanceBand::Critical => "immediate financial intervention required",
    };
    format!("Cost performance is {} at {cpi:.2}, {tail}.", band.name())
}

/// Share of the planned window elapsed at `today`, in percent. `None`
/// once the window has closed or when dates are missing.
fn expected_progress(project: &Project, today: NaiveDate) -> Option<f64> {
    let (start, end) = project.planned_window()?;
    if today >= end {
        return None;
    }
    let total = (end - start).num_days() as f64;
    if total <= 0.0 {
        return Some(0.0);
    }
    let elapsed = (today - start).num_days().max(0) as f64;
    Some((elapsed / total * 100.0).clamp(0.0, 100.0))
}

/// Insights for one project, in a fixed order: schedule band, cost band,
/// combined reading, progress against plan, open risk count.
pub fn project_insights(
    project: &Project,
    current: &CurrentMetrics,
    today: NaiveDate,
    high_risk_count: u32,
) -> Vec<String> {
    let (spi, cpi) = (current.spi, current.cpi);
    let mut insights = vec![schedule_sentence(spi), cost_sentence(cpi)];

    if spi < 0.9 && cpi < 0.9 {
        insights.push(
            "Schedule and cost are both below 0.9; the combined risk is high.".to_string(),
        );
    } else if spi > 1.05 && cpi > 1.05 {
        insights.push("Schedule and cost performance are both exceptional.".to_string());
    }

    if let (Some(actual), Some(expected)) = (project.completion_pct, expected_progress(project, today)) {
        let diff = actual - expected;
        let lead = if diff < -20.0 {
            Some("significantly behind")
        } else if diff < -10.0 {
            Some("behind")
        } else if diff > 20.0 {
            Some("significantly ahead of")
        } else if diff > 10.0 {
            Some("ahead of")
        } else {
            None
        };
        if let Some(lead) = lead {
            insights.push(format!(
                "Project is {lead} expected progress ({actual:.1}% vs expected {expected:.1}%)."
            ));
        }
    }

    if let Some(count) = project.risk_count.filter(|&c| c > high_risk_count) {
        insights.push(format!(
            "Elevated risk profile with {count} open risks; review mitigation plans."
        ));
    }

    insights
}

/// Portfolio-wide insights. Falls back to one neutral sentence.
pub fn portfolio_insights(
    portfolio: &PortfolioMetrics,
    latest: &BTreeMap<ProjectId, CurrentMetrics>,
    anomalies: &BTreeMap<ProjectId, AnomalyResult>,
) -> Vec<String> {
    let mut insights = Vec::new();

    if portfolio.at_risk_projects > 0 && portfolio.total_projects > 0 {
        let share = portfolio.at_risk_projects as f64 / portfolio.total_projects as f64 * 100.0;
        insights.push(format!(
            "{} of {} projects ({share:.0}%) are At Risk or Delayed.",
            portfolio.at_risk_projects, portfolio.total_projects
        ));
    }

    if portfolio.avg_spi < 0.9 {
        insights.push(format!(
            "Portfolio schedule performance is behind plan (average SPI {:.2}).",
            portfolio.avg_spi
        ));
    } else if portfolio.avg_spi > 1.05 {
        insights.push(format!(
            "Portfolio schedule performance is ahead of plan (average SPI {:.2}).",
            portfolio.avg_spi
        ));
    }

    if portfolio.avg_cpi < 0.9 {
        insights.push(format!(
            "Portfolio cost performance is over budget (average CPI {:.2}).",
            portfolio.avg_cpi
        ));
    } else if portfolio.avg_cpi > 1.05 {
        insights.push(format!(
            "Portfolio cost performance is under budget (average CPI {:.2}).",
            portfolio.avg_cpi
        ));
    }

    let critical = latest.values().filter(|m| m.spi < 0.8).count();
    if critical > 0 {
        insights.push(format!(
            "{critical} project(s) have SPI below 0.8 and need schedule recovery."
        ));
    }

    let anomalous = anomalies.values().filter(|a| a.is_anomaly).count();
    if anomalous > 0 {
        insights.push(format!(
            "{anomalous} project(s) show anomalous performance relative to the portfolio."
        ));
    }

    if insights.is_empty() {
        insights.push("Portfolio performance is within normal ranges.".to_string());
    }
    insights
}
