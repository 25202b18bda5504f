//! Trend-weighted blending of the EVM point forecast into a
//! [`ForecastResult`] with best/worst bounds and narrative risk factors.

use std::collections::BTreeSet;

use pulse_core::constants::{
    COMPLETION_BUFFER_FRACTION, COST_BEST_FACTOR, COST_WORST_FACTOR, MODERATE_DELAY_DAYS,
    MODERATE_OVERRUN_PCT, SIGNIFICANT_DELAY_DAYS, SIGNIFICANT_OVERRUN_PCT,
    SIGNIFICANT_SHORTFALL_MARGIN,
};
use pulse_core::errors::ForecastError;
use pulse_core::models::{ForecastModel, ForecastResult, HistoryRecord, Project};
use pulse_core::PulseConfig;

use super::evm::{offset_date, PointForecast};
use crate::trend::{is_declining, TrendModel};

/// Blending weights, confidence levels, and risk thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleSettings {
    /// Weight of the trend projection; EVM gets the rest.
    pub trend_weight: f64,
    pub confidence_with_trend: u8,
    pub confidence_evm_only: u8,
    pub spi_threshold: f64,
    pub cpi_threshold: f64,
    pub high_risk_count: u32,
}

impl EnsembleSettings {
    pub fn from_config(config: &PulseConfig) -> Self {
        Self {
            trend_weight: config.forecast.effective_trend_weight(),
            confidence_with_trend: config.forecast.effective_confidence_with_trend(),
            confidence_evm_only: config.forecast.effective_confidence_evm_only(),
            spi_threshold: config.analysis.effective_spi_threshold(),
            cpi_threshold: config.analysis.effective_cpi_threshold(),
            high_risk_count: config.forecast.effective_high_risk_count(),
        }
    }
}

impl Default for EnsembleSettings {
    fn default() -> Self {
        Self::from_config(&PulseConfig::default())
    }
}

/// Combine the EVM forecast with a trend projection, when one is usable.
///
/// Schedule and cost blend independently: a usable SPI projection moves
/// the completion date and raises confidence, a usable CPI projection
/// moves the final cost.
pub fn blend(
    evm: &PointForecast,
    trend: Option<&TrendModel>,
    project: &Project,
    history: &[HistoryRecord],
    settings: &EnsembleSettings,
) -> Result<ForecastResult, ForecastError> {
    let w = settings.trend_weight;
    let mut models = BTreeSet::from([ForecastModel::Evm]);

    let mut offset = evm.completion_offset_days;
    if let Some(spi) = trend.and_then(|t| t.avg_future_spi) {
        offset = w * evm.offset_at(spi) + (1.0 - w) * offset;
        models.insert(ForecastModel::ScheduleTrend);
    }

    let mut final_cost = evm.forecast_final_cost;
    if let Some(cpi) = trend.and_then(|t| t.avg_future_cpi) {
        final_cost = w * evm.cost_at(cpi) + (1.0 - w) * final_cost;
        models.insert(ForecastModel::CostTrend);
    }

    let confidence = if models.contains(&ForecastModel::ScheduleTrend) {
        settings.confidence_with_trend
    } else {
        settings.confidence_evm_only
    };

    let buffer = COMPLETION_BUFFER_FRACTION * evm.planned_duration_days;
    let out_of_range = || ForecastError::DateOutOfRange {
        project_id: project.id.to_string(),
    };
    let completion = offset_date(evm.planned_start, offset).ok_or_else(out_of_range)?;
    let best = offset_date(evm.planned_start, offset - buffer / 2.0).ok_or_else(out_of_range)?;
    let worst = offset_date(evm.planned_start, offset + buffer).ok_or_else(out_of_range)?;

    let schedule_variance_days = (completion - evm.planned_end).num_days();
    let cost_variance = final_cost - project.budget;

    let risk_factors = risk_factors(
        evm.spi,
        evm.cpi,
        history,
        schedule_variance_days,
        cost_variance / project.budget * 100.0,
        project.risk_count,
        settings,
    );

    Ok(ForecastResult {
        project_id: project.id.clone(),
        forecast_completion_date: completion,
        completion_date_best: best,
        completion_date_worst: worst,
        forecast_final_cost: final_cost,
        final_cost_best: final_cost * COST_BEST_FACTOR,
        final_cost_worst: final_cost * COST_WORST_FACTOR,
        confidence,
        schedule_variance_days,
        cost_variance,
        risk_factors,
        forecast_models_used: models,
        spi_used: evm.spi,
        cpi_used: evm.cpi,
    })
}

fn shortfall(label: &str, index: &str, value: f64, threshold: f64) -> Option<String> {
    if value < threshold - SIGNIFICANT_SHORTFALL_MARGIN {
        Some(format!(
            "{label} performance is significantly below threshold ({index} {value:.2})"
        ))
    } else if value < threshold {
        Some(format!("{label} performance is below threshold ({index} {value:.2})"))
    } else {
        None
    }
}

/// Narrative risk factors, in check order.
fn risk_factors(
    spi: f64,
    cpi: f64,
    history: &[HistoryRecord],
    schedule_variance_days: i64,
    overrun_pct: f64,
    risk_count: Option<u32>,
    settings: &EnsembleSettings,
) -> Vec<String> {
    let mut factors = Vec::new();

    factors.extend(shortfall("Schedule", "SPI", spi, settings.spi_threshold));
    factors.extend(shortfall("Cost", "CPI", cpi, settings.cpi_threshold));

    let spi_series: Vec<f64> = history.iter().map(|h| h.spi).collect();
    let cpi_series: Vec<f64> = history.iter().map(|h| h.cpi).collect();
    if is_declining(&spi_series) {
        factors.push("Declining SPI trend over the last 3 periods".to_string());
    }
    if is_declining(&cpi_series) {
        factors.push("Declining CPI trend over the last 3 periods".to_string());
    }

    if schedule_variance_days > SIGNIFICANT_DELAY_DAYS {
        factors.push(format!("Significant delay of {schedule_variance_days} days"));
    } else if schedule_variance_days > MODERATE_DELAY_DAYS {
        factors.push(format!("Moderate delay of {schedule_variance_days} days"));
    }

    if overrun_pct > SIGNIFICANT_OVERRUN_PCT {
        factors.push(format!("Significant budget overrun of {overrun_pct:.1}%"));
    } else if overrun_pct > MODERATE_OVERRUN_PCT {
        factors.push(format!("Moderate budget overrun of {overrun_pct:.1}%"));
    }

    if let Some(count) = risk_count.filter(|&c| c > settings.high_risk_count) {
        factors.push(format!("High number of open risks ({count})"));
    }

    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::evm::forecast_evm;
    use crate::trend::fit_trend;
    use chrono::NaiveDate;
    use pulse_core::models::{CurrentMetrics, ProjectStatus};
    use pulse_core::types::MonthKey;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project() -> Project {
        Project::new("P1", 1000.0, ProjectStatus::OnTrack)
            .with_window(date(2024, 1, 1), date(2024, 4, 10))
    }

    fn history(points: &[(f64, f64)]) -> Vec<HistoryRecord> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(spi, cpi))| {
                let month = MonthKey::new(2024, 1).unwrap().plus_months(i as u32);
                HistoryRecord::new("P1", month, spi, cpi)
            })
            .collect()
    }

    fn evm(spi: f64, cpi: f64, now: NaiveDate) -> PointForecast {
        let current = CurrentMetrics {
            spi,
            cpi,
            actual_cost: Some(500.0),
            ..CurrentMetrics::neutral()
        };
        forecast_evm(&project(), &current, now).unwrap()
    }

    #[test]
    fn test_evm_only_without_trend() {
        let point = evm(1.0, 1.0, date(2024, 1, 1));
        let result = blend(&point, None, &project(), &[], &EnsembleSettings::default()).unwrap();

        assert_eq!(result.confidence, 60);
        assert_eq!(result.forecast_models_used, BTreeSet::from([ForecastModel::Evm]));
        assert_eq!(result.forecast_completion_date, date(2024, 4, 10));
        // Buffer 15 days: best 7.5 earlier (rounded), worst 15 later.
        assert_eq!(result.completion_date_worst, date(2024, 4, 25));
        assert_eq!(result.completion_date_best, date(2024, 4, 3));
        assert!((result.final_cost_best - 950.0).abs() < 1e-9);
        assert!((result.final_cost_worst - 1200.0).abs() < 1e-9);
        assert!(result.risk_factors.is_empty());
    }

    #[test]
    fn test_trend_weighting() {
        // Flat 0.5 SPI history; EVM sees 1.0.
        let h = history(&[(0.5, 1.0), (0.5, 1.0), (0.5, 1.0)]);
        let trend = fit_trend(&h, 3, 3).unwrap();
        let point = evm(1.0, 1.0, date(2024, 1, 1));
        let result =
            blend(&point, Some(&trend), &project(), &h, &EnsembleSettings::default()).unwrap();

        assert_eq!(result.confidence, 80);
        assert!(result.used(ForecastModel::ScheduleTrend));
        assert!(result.used(ForecastModel::CostTrend));
        // 0.75 * 200 + 0.25 * 100 = 175 days.
        assert_eq!(result.forecast_completion_date, date(2024, 1, 1) + chrono::Duration::days(175));
        assert_eq!(result.schedule_variance_days, 75);
    }

    #[test]
    fn test_risk_factor_order() {
        let h = history(&[(0.95, 0.8), (0.9, 0.7), (0.85, 0.6)]);
        let mut p = project();
        p.risk_count = Some(8);
        // 100 / 0.85 = 117.6 days (18 late); 500 + 500 / 0.6 = 1333 (33% over).
        let point = evm(0.85, 0.6, date(2024, 1, 1));
        let result = blend(&point, None, &p, &h, &EnsembleSettings::default()).unwrap();

        let f = &result.risk_factors;
        assert!(f[0].starts_with("Schedule performance is below threshold"));
        assert!(f[1].starts_with("Cost performance is significantly below threshold"));
        assert!(f[2].starts_with("Declining SPI"));
        assert!(f[3].starts_with("Declining CPI"));
        assert_eq!(f[4], "Moderate delay of 18 days");
        assert_eq!(f[5], "Significant budget overrun of 33.3%");
        assert_eq!(f[6], "High number of open risks (8)");
        assert_eq!(f.len(), 7);
    }

    #[test]
    fn test_only_cpi_trend_keeps_evm_confidence() {
        let h = history(&[(0.6, 1.0), (0.3, 1.0), (0.0, 1.0)]);
        let trend = fit_trend(&h, 3, 3).unwrap();
        let point = evm(1.0, 1.0, date(2024, 1, 1));
        let result =
            blend(&point, Some(&trend), &project(), &h, &EnsembleSettings::default()).unwrap();
        assert_eq!(result.confidence, 60);
        assert!(!result.used(ForecastModel::ScheduleTrend));
        assert!(result.used(ForecastModel::CostTrend));
    }
}
