//! Linear trend regression over a project's monthly index history.

use serde::{Deserialize, Serialize};

use pulse_core::constants::NEUTRAL_INDEX;
use pulse_core::errors::TrendError;
use pulse_core::models::HistoryRecord;
use pulse_core::types::MonthKey;

/// Ordinary least squares fit of index against month number `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    /// Number of points fitted.
    pub points: usize,
}

impl LinearFit {
    /// Fit `values[i]` against `i`. Needs at least two points.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < 2 {
            return None;
        }
        let nf = n as f64;
        let x_mean = (nf - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / nf;

        let (sxy, sxx) = values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
                let dx = i as f64 - x_mean;
                (sxy + dx * (y - y_mean), sxx + dx * dx)
            });

        let slope = sxy / sxx;
        Some(Self {
            intercept: y_mean - slope * x_mean,
            slope,
            points: n,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Mean of the next `horizon` projected values.
    ///
    /// The projections are linear, so their mean is the prediction at the
    /// midpoint of the horizon.
    pub fn average_ahead(&self, horizon: u32) -> f64 {
        let horizon = horizon.max(1) as f64;
        self.predict(self.points as f64 + (horizon - 1.0) / 2.0)
    }
}

/// Fitted SPI and CPI trends with their projected averages.
///
/// Each side is usable independently; a `None` average means that index's
/// projection was non-physical and must not feed the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendModel {
    pub spi_fit: LinearFit,
    pub cpi_fit: LinearFit,
    pub avg_future_spi: Option<f64>,
    pub avg_future_cpi: Option<f64>,
    pub horizon: u32,
}

fn usable(projected: f64) -> Option<f64> {
    (projected.is_finite() && projected > 0.0).then_some(projected)
}

/// Fit SPI and CPI trends over `history` (oldest first) and project
/// `horizon` months ahead.
///
/// Fewer than `min_points` records yields
/// [`TrendError::InsufficientHistory`]; if neither projection is a usable
/// index the result is [`TrendError::NotUsable`].
pub fn fit_trend(
    history: &[HistoryRecord],
    horizon: u32,
    min_points: usize,
) -> Result<TrendModel, TrendError> {
    let required = min_points.max(2);
    if history.len() < required {
        return Err(TrendError::InsufficientHistory {
            points: history.len(),
            required,
        });
    }

    let spi: Vec<f64> = history.iter().map(|h| h.spi).collect();
    let cpi: Vec<f64> = history.iter().map(|h| h.cpi).collect();

    let (Some(spi_fit), Some(cpi_fit)) = (LinearFit::fit(&spi), LinearFit::fit(&cpi)) else {
        return Err(TrendError::InsufficientHistory {
            points: history.len(),
            required,
        });
    };

    let spi_projected = spi_fit.average_ahead(horizon);
    let cpi_projected = cpi_fit.average_ahead(horizon);
    let avg_future_spi = usable(spi_projected);
    let avg_future_cpi = usable(cpi_projected);

    if avg_future_spi.is_none() && avg_future_cpi.is_none() {
        return Err(TrendError::NotUsable {
            metric: "spi",
            projected: spi_projected,
        });
    }

    Ok(TrendModel {
        spi_fit,
        cpi_fit,
        avg_future_spi,
        avg_future_cpi,
        horizon: horizon.max(1),
    })
}

/// True when the last three values are monotonically non-increasing.
/// A flat tail counts: the series has stopped improving.
pub fn is_declining(values: &[f64]) -> bool {
    match values {
        [.., a, b, c] => b <= a && c <= b,
        _ => false,
    }
}

/// One month of a presented forecast series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub month: MonthKey,
    pub spi: f64,
    pub cpi: f64,
}

/// Recency-weighted mean of the history, regressed toward 1.0 a further
/// 20% each month ahead.
///
/// Weights rise linearly from 1 (oldest) to 3 (latest). Presentational
/// only; the ensemble uses [`fit_trend`].
pub fn mean_reversion_path(history: &[HistoryRecord], horizon: u32) -> Vec<ProjectionPoint> {
    let Some(last) = history.last() else {
        return Vec::new();
    };

    let n = history.len();
    let weights: Vec<f64> = if n == 1 {
        vec![1.0]
    } else {
        (0..n)
            .map(|i| 1.0 + 2.0 * i as f64 / (n - 1) as f64)
            .collect()
    };
    let total: f64 = weights.iter().sum();
    let weighted = |f: fn(&HistoryRecord) -> f64| {
        history
            .iter()
            .zip(&weights)
            .map(|(h, w)| f(h) * w)
            .sum::<f64>()
            / total
    };
    let avg_spi = weighted(|h| h.spi);
    let avg_cpi = weighted(|h| h.cpi);

    (1..=horizon)
        .map(|step| {
            let pull = (0.2 * step as f64).min(1.0);
            ProjectionPoint {
                month: last.month.plus_months(step),
                spi: avg_spi * (1.0 - pull) + NEUTRAL_INDEX * pull,
                cpi: avg_cpi * (1.0 - pull) + NEUTRAL_INDEX * pull,
            }
        })
        .collect()
}
