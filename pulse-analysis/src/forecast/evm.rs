//! Earned-value extrapolation.
//!
//! Dates are carried as fractional day offsets from `planned_start` and
//! only rounded to a calendar date at the end, so the ensemble can blend
//! offsets without compounding rounding error.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use pulse_core::constants::{DEFAULT_COMPLETION_FRACTION, DEGENERATE_CPI_COST_FACTOR};
use pulse_core::errors::ForecastError;
use pulse_core::models::{CurrentMetrics, Project};

/// A valid index is finite and strictly positive. Anything else takes the
/// documented fallback path instead of being divided by.
pub fn valid_index(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Single-point EVM forecast for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointForecast {
    pub planned_start: NaiveDate,
    pub planned_end: NaiveDate,
    pub planned_duration_days: f64,
    /// Days since planned start, never negative.
    pub elapsed_days: f64,
    /// Planned days still to go at `now`, never negative.
    pub planned_remaining_days: f64,
    /// Forecast completion as an offset from planned start.
    pub completion_offset_days: f64,
    /// Actual cost to date, reported or estimated.
    pub spent: f64,
    /// True when `spent` was estimated from progress rather than reported.
    pub spent_estimated: bool,
    pub forecast_final_cost: f64,
    pub budget: f64,
    /// SPI used (1.0 when the reported value was not finite).
    pub spi: f64,
    /// CPI used (1.0 when the reported value was not finite).
    pub cpi: f64,
}

impl PointForecast {
    pub fn completion_date(&self) -> Option<NaiveDate> {
        offset_date(self.planned_start, self.completion_offset_days)
    }

    /// Positive = late, in fractional days.
    pub fn schedule_variance_days(&self) -> f64 {
        self.completion_offset_days - self.planned_duration_days
    }

    /// Positive = over budget.
    pub fn cost_variance(&self) -> f64 {
        self.forecast_final_cost - self.budget
    }

    /// Completion offset if the remaining planned work proceeds at `spi`.
    pub fn offset_at(&self, spi: f64) -> f64 {
        match valid_index(spi) {
            Some(spi) => self.elapsed_days + self.planned_remaining_days / spi,
            None => self.elapsed_days + self.planned_remaining_days,
        }
    }

    /// Final cost if the remaining budget is spent at `cpi`.
    pub fn cost_at(&self, cpi: f64) -> f64 {
        match valid_index(cpi) {
            Some(cpi) => self.spent + (self.budget - self.spent) / cpi,
            None => self.budget * DEGENERATE_CPI_COST_FACTOR,
        }
    }
}

/// Round a fractional day offset onto a calendar date.
pub fn offset_date(start: NaiveDate, offset_days: f64) -> Option<NaiveDate> {
    if !offset_days.is_finite() {
        return None;
    }
    let days = Duration::try_days(offset_days.round() as i64)?;
    start.checked_add_signed(days)
}

/// Extrapolate completion date and final cost from current indices.
///
/// Missing planned dates are a normal "insufficient data" outcome and come
/// back as [`ForecastError::MissingPlannedDates`]. A non-positive SPI keeps
/// the raw remaining time; a non-positive CPI forecasts 1.5x budget.
pub fn forecast_evm(
    project: &Project,
    current: &CurrentMetrics,
    now: NaiveDate,
) -> Result<PointForecast, ForecastError> {
    let (start, end) = project
        .planned_window()
        .ok_or_else(|| ForecastError::MissingPlannedDates {
            project_id: project.id.to_string(),
        })?;

    let spi = if current.spi.is_finite() { current.spi } else { 1.0 };
    let cpi = if current.cpi.is_finite() { current.cpi } else { 1.0 };

    let planned_duration = (end - start).num_days() as f64;
    let elapsed = ((now - start).num_days() as f64).max(0.0);
    let planned_remaining = (planned_duration - elapsed).max(0.0);

    if valid_index(spi).is_none() {
        tracing::debug!(project_id = %project.id, spi, "degenerate SPI; keeping raw remaining time");
    }

    let budget = project.budget;
    let reported_spent = current.actual_cost.or(project.actual_cost);
    let spent = match reported_spent {
        Some(actual) => actual,
        None => {
            let fraction = project
                .completion_pct
                .map(|pct| pct / 100.0)
                .or(current.progress)
                .unwrap_or(DEFAULT_COMPLETION_FRACTION);
            match valid_index(cpi) {
                Some(cpi) => budget * fraction / cpi,
                None => budget * fraction,
            }
        }
    };

    if valid_index(cpi).is_none() {
        tracing::debug!(project_id = %project.id, cpi, "degenerate CPI; pessimistic cost fallback");
    }

    let mut forecast = PointForecast {
        planned_start: start,
        planned_end: end,
        planned_duration_days: planned_duration,
        elapsed_days: elapsed,
        planned_remaining_days: planned_remaining,
        completion_offset_days: 0.0,
        spent,
        spent_estimated: reported_spent.is_none(),
        forecast_final_cost: 0.0,
        budget,
        spi,
        cpi,
    };
    forecast.completion_offset_days = forecast.offset_at(spi);
    forecast.forecast_final_cost = forecast.cost_at(cpi);

    if !forecast.completion_offset_days.is_finite() {
        return Err(ForecastError::NonFinite {
            project_id: project.id.to_string(),
            field: "completion_date",
        });
    }
    if !forecast.forecast_final_cost.is_finite() {
        return Err(ForecastError::NonFinite {
            project_id: project.id.to_string(),
            field: "forecast_final_cost",
        });
    }
    if forecast.completion_date().is_none() {
        return Err(ForecastError::DateOutOfRange {
            project_id: project.id.to_string(),
        });
    }

    Ok(forecast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::models::{IndexSource, ProjectStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project() -> Project {
        Project::new("P1", 1000.0, ProjectStatus::OnTrack)
            .with_window(date(2024, 1, 1), date(2024, 4, 10))
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

    #[test]
    fn test_on_plan_at_start_has_no_variance() {
        let f = forecast_evm(&project(), &metrics(1.0, 1.0, None), date(2024, 1, 1)).unwrap();
        assert_eq!(f.schedule_variance_days(), 0.0);
        assert_eq!(f.completion_date(), Some(date(2024, 4, 10)));
    }

    #[test]
    fn test_slow_spi_stretches_remaining_time() {
        // 100-day plan, 50 elapsed, SPI 0.5: 50 remaining become 100.
        let f = forecast_evm(&project(), &metrics(0.5, 1.0, None), date(2024, 2, 20)).unwrap();
        assert_eq!(f.elapsed_days, 50.0);
        assert_eq!(f.completion_offset_days, 150.0);
        assert_eq!(f.schedule_variance_days(), 50.0);
    }

    #[test]
    fn test_eac_identity() {
        let f = forecast_evm(&project(), &metrics(1.0, 0.8, Some(400.0)), date(2024, 2, 1)).unwrap();
        assert!((f.forecast_final_cost - (400.0 + 600.0 / 0.8)).abs() < 1e-9);
        assert!((f.cost_variance() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_spi_keeps_raw_remaining() {
        let f = forecast_evm(&project(), &metrics(0.0, 1.0, None), date(2024, 2, 20)).unwrap();
        assert_eq!(f.completion_offset_days, 100.0);
    }

    #[test]
    fn test_zero_cpi_uses_pessimistic_cost() {
        let f = forecast_evm(&project(), &metrics(1.0, 0.0, None), date(2024, 2, 1)).unwrap();
        assert_eq!(f.forecast_final_cost, 1500.0);
        assert!(f.spent.is_finite());
    }

    #[test]
    fn test_estimated_spend_uses_completion_pct() {
        let mut p = project();
        p.completion_pct = Some(40.0);
        let f = forecast_evm(&p, &metrics(1.0, 0.5, None), date(2024, 2, 1)).unwrap();
        assert!(f.spent_estimated);
        assert!((f.spent - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_window() {
        let day = date(2024, 1, 1);
        let p = Project::new("P1", 10.0, ProjectStatus::OnTrack).with_window(day, day);
        let f = forecast_evm(&p, &metrics(0.7, 1.0, None), day).unwrap();
        assert_eq!(f.planned_remaining_days, 0.0);
        assert_eq!(f.completion_date(), Some(day));
    }

    #[test]
    fn test_missing_dates() {
        let p = Project::new("P1", 10.0, ProjectStatus::OnTrack);
        let err = forecast_evm(&p, &CurrentMetrics::neutral(), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, ForecastError::MissingPlannedDates { .. }));
    }

    #[test]
    fn test_tiny_spi_is_rejected_not_propagated() {
        let err = forecast_evm(&project(), &metrics(1e-300, 1.0, None), date(2024, 1, 2)).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::NonFinite { .. } | ForecastError::DateOutOfRange { .. }
        ));
    }
}
