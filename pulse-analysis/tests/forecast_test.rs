//! EVM and ensemble forecasting properties.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use pulse_analysis::forecast::{blend, forecast_evm, EnsembleSettings};
use pulse_analysis::trend::fit_trend;
use pulse_core::errors::ForecastError;
use pulse_core::models::{CurrentMetrics, HistoryRecord, IndexSource, Project, ProjectStatus};
use pulse_core::types::MonthKey;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn project(budget: f64, duration_days: i64) -> Project {
    Project::new("P1", budget, ProjectStatus::OnTrack)
        .with_window(start(), start() + Duration::days(duration_days))
}

fn metrics(spi: f64, cpi: f64, actual: Option<f64>) -> CurrentMetrics {
    CurrentMetrics {
        spi,
        cpi,
        actual_cost: actual,
        source: IndexSource::Tasks,
        ..CurrentMetrics::neutral()
    }
}

fn history(points: &[(f64, f64)]) -> Vec<HistoryRecord> {
    points
        .iter()
        .enumerate()
        .map(|(i, &(spi, cpi))| {
            HistoryRecord::new("P1", MonthKey::new(2023, 6).unwrap().plus_months(i as u32), spi, cpi)
        })
        .collect()
}

proptest! {
    #[test]
    fn eac_identity(
        budget in 1.0f64..1e7,
        spent_share in 0.0f64..1.5,
        cpi in 0.05f64..3.0,
        elapsed in 0i64..400,
    ) {
        let p = project(budget, 365);
        let actual = budget * spent_share;
        let now = start() + Duration::days(elapsed);
        let f = forecast_evm(&p, &metrics(1.0, cpi, Some(actual)), now).unwrap();
        let expected = actual + (budget - actual) / cpi;
        prop_assert!((f.forecast_final_cost - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    }

    #[test]
    fn eac_equals_budget_on_plan(budget in 1.0f64..1e7, progress in 0.0f64..1.0) {
        let p = project(budget, 200);
        let f = forecast_evm(&p, &metrics(1.0, 1.0, Some(budget * progress)), start()).unwrap();
        prop_assert!((f.forecast_final_cost - budget).abs() <= 1e-9 * budget);
        prop_assert!(f.cost_variance().abs() <= 1e-9 * budget);
    }

    #[test]
    fn no_schedule_drift_on_plan_at_start(duration in 0i64..2000, cpi in 0.1f64..2.0) {
        let p = project(1000.0, duration);
        let f = forecast_evm(&p, &metrics(1.0, cpi, None), start()).unwrap();
        prop_assert_eq!(f.schedule_variance_days(), 0.0);
        prop_assert_eq!(f.completion_date(), p.planned_end);
    }

    #[test]
    fn confidence_is_one_of_two_levels(
        spi in -1.0f64..3.0,
        cpi in -1.0f64..3.0,
        hist in proptest::collection::vec((0.0f64..2.0, 0.0f64..2.0), 0..8),
        elapsed in 0i64..300,
    ) {
        // Vanishingly small positive SPI pushes completion past the calendar.
        prop_assume!(spi <= 0.0 || spi >= 0.01);
        let p = project(1000.0, 180);
        let h = history(&hist);
        let now = start() + Duration::days(elapsed);
        let point = forecast_evm(&p, &metrics(spi, cpi, None), now).unwrap();
        let trend = fit_trend(&h, 3, 3).ok();
        match blend(&point, trend.as_ref(), &p, &h, &EnsembleSettings::default()) {
            Ok(result) => {
                prop_assert!(result.confidence == 60 || result.confidence == 80);
                prop_assert!(result.completion_date_best <= result.forecast_completion_date);
                prop_assert!(result.forecast_completion_date <= result.completion_date_worst);
                prop_assert!(result.forecast_final_cost.is_finite());
                prop_assert!(result.final_cost_best.is_finite() && result.final_cost_worst.is_finite());
            }
            Err(e) => prop_assert!(matches!(e, ForecastError::DateOutOfRange { .. }), "{}", e),
        }
    }
}

#[test]
fn test_zero_duration_has_no_division_error() {
    let p = project(500.0, 0);
    for spi in [0.0, 0.5, 1.0, -2.0, f64::NAN] {
        let f = forecast_evm(&p, &metrics(spi, 1.0, None), start()).unwrap();
        assert_eq!(f.planned_remaining_days, 0.0);
        assert_eq!(f.completion_date(), Some(start()));
    }
}

#[test]
fn test_degenerate_indices_never_yield_nan() {
    let p = project(1000.0, 100);
    for (spi, cpi) in [(0.0, 0.0), (-1.0, -1.0), (f64::NAN, f64::INFINITY)] {
        let f = forecast_evm(&p, &metrics(spi, cpi, None), start() + Duration::days(10)).unwrap();
        assert!(f.completion_offset_days.is_finite());
        assert!(f.forecast_final_cost.is_finite());
    }
}

#[test]
fn test_trend_pulls_completion_later() {
    let p = project(1000.0, 100);
    let h = history(&[(0.9, 1.0), (0.8, 1.0), (0.7, 1.0)]);
    let point = forecast_evm(&p, &metrics(1.0, 1.0, Some(0.0)), start()).unwrap();
    let trend = fit_trend(&h, 3, 3).unwrap();

    let evm_only = blend(&point, None, &p, &h, &EnsembleSettings::default()).unwrap();
    let blended = blend(&point, Some(&trend), &p, &h, &EnsembleSettings::default()).unwrap();

    assert_eq!(evm_only.confidence, 60);
    assert_eq!(blended.confidence, 80);
    assert!(blended.forecast_completion_date > evm_only.forecast_completion_date);
    assert!(blended.risk_factors.iter().any(|f| f.starts_with("Declining SPI")));
}

#[test]
fn test_configured_weights_respected() {
    let p = project(1000.0, 100);
    let h = history(&[(0.5, 1.0), (0.5, 1.0), (0.5, 1.0)]);
    let point = forecast_evm(&p, &metrics(1.0, 1.0, Some(0.0)), start()).unwrap();
    let trend = fit_trend(&h, 3, 3).unwrap();
    let settings = EnsembleSettings {
        trend_weight: 0.5,
        confidence_with_trend: 90,
        ..EnsembleSettings::default()
    };
    let r = blend(&point, Some(&trend), &p, &h, &settings).unwrap();
    // 0.5 * 200 + 0.5 * 100.
    assert_eq!(r.forecast_completion_date, start() + Duration::days(150));
    assert_eq!(r.confidence, 90);
}
