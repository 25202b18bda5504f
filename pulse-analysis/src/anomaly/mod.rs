//! Batch-relative anomaly scoring.
//!
//! Small batches (fewer than `min_forest_rows`) use per-column deviation
//! counts; larger ones use an isolation forest. The method travels with
//! every score (see [`AnomalyScore`]) so the two scales are never mixed.

pub mod forest;
pub mod matrix;
pub mod zscore;

pub use forest::IsolationForest;
pub use matrix::{MetricColumn, MetricMatrix};

use pulse_core::config::AnomalyConfig;
use pulse_core::models::{AnomalyMethod, AnomalyResult, AnomalyScore};
use pulse_core::types::collections::BTreeMap;
use pulse_core::types::ProjectId;

/// Resolved anomaly pass settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalySettings {
    pub contamination: f64,
    pub seed: u64,
    pub n_estimators: usize,
    pub max_samples: usize,
    pub min_forest_rows: usize,
    pub zscore_threshold: f64,
}

impl AnomalySettings {
    pub fn from_config(config: &AnomalyConfig) -> Self {
        Self {
            contamination: config.effective_contamination(),
            seed: config.effective_seed(),
            n_estimators: config.effective_n_estimators(),
            max_samples: config.effective_max_samples(),
            min_forest_rows: config.effective_min_forest_rows(),
            zscore_threshold: config.effective_zscore_threshold(),
        }
    }

    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    /// Which method a matrix with `rows` rows is scored with.
    pub fn method_for(&self, rows: usize) -> AnomalyMethod {
        if rows < self.min_forest_rows {
            AnomalyMethod::ZScore
        } else {
            AnomalyMethod::Forest
        }
    }
}

impl Default for AnomalySettings {
    fn default() -> Self {
        Self::from_config(&AnomalyConfig::default())
    }
}

/// Score every row with default settings and the given contamination.
pub fn detect(matrix: &MetricMatrix, contamination: f64) -> BTreeMap<ProjectId, AnomalyResult> {
    detect_with(matrix, &AnomalySettings::default().with_contamination(contamination))
}

/// Score every row of `matrix` relative to the whole batch.
///
/// Pure: the same matrix and settings always give the same results.
pub fn detect_with(
    matrix: &MetricMatrix,
    settings: &AnomalySettings,
) -> BTreeMap<ProjectId, AnomalyResult> {
    if matrix.is_empty() {
        return BTreeMap::new();
    }

    let columns = matrix.filled_columns();
    let method = settings.method_for(matrix.row_count());
    tracing::debug!(
        rows = matrix.row_count(),
        columns = matrix.column_count(),
        method = %method,
        "scoring anomaly matrix"
    );

    if matrix.column_count() == 0 {
        tracing::warn!(
            rows = matrix.row_count(),
            "anomaly matrix has no metric columns; every row scored as normal"
        );
        let neutral = || match method {
            AnomalyMethod::ZScore => AnomalyScore::ZScore { score: 0 },
            AnomalyMethod::Forest => AnomalyScore::Forest { score: 0.0 },
        };
        return matrix
            .ids()
            .iter()
            .map(|id| {
                let result = AnomalyResult {
                    project_id: id.clone(),
                    is_anomaly: false,
                    score: neutral(),
                };
                (id.clone(), result)
            })
            .collect();
    }

    let scores: Vec<(bool, AnomalyScore)> = match method {
        AnomalyMethod::ZScore => zscore::score(&columns, settings.zscore_threshold)
            .into_iter()
            .map(|count| (count > 0, AnomalyScore::ZScore { score: count }))
            .collect(),
        AnomalyMethod::Forest => {
            let rows = forest::standardize(&columns);
            let model = IsolationForest::fit(
                &rows,
                settings.n_estimators,
                settings.max_samples,
                settings.seed,
            );
            let raw = model.score_samples(&rows);
            forest::decision_function(&raw, settings.contamination)
                .into_iter()
                .map(|d| (d < 0.0, AnomalyScore::Forest { score: d.abs() }))
                .collect()
        }
    };

    matrix
        .ids()
        .iter()
        .zip(scores)
        .map(|(id, (is_anomaly, score))| {
            (
                id.clone(),
                AnomalyResult {
                    project_id: id.clone(),
                    is_anomaly,
                    score,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(values: &[f64]) -> MetricMatrix {
        let mut m = MetricMatrix::new(vec![MetricColumn::Spi]);
        for (i, v) in values.iter().enumerate() {
            m.push_row(ProjectId::new(format!("P{i:02}")), vec![Some(*v)]);
        }
        m
    }

    #[test]
    fn test_method_switch() {
        let s = AnomalySettings::default();
        assert_eq!(s.method_for(9), AnomalyMethod::ZScore);
        assert_eq!(s.method_for(10), AnomalyMethod::Forest);
    }

    #[test]
    fn test_small_batch_uses_counts() {
        let out = detect(&matrix(&[1.0, 0.98, 1.02, 0.99, 1.01, 1.0, 0.97, 1.03, 0.3]), 0.1);
        let flagged: Vec<_> = out.values().filter(|r| r.is_anomaly).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].project_id.as_str(), "P08");
        assert_eq!(flagged[0].score, AnomalyScore::ZScore { score: 1 });
    }

    #[test]
    fn test_large_batch_uses_forest() {
        let mut values: Vec<f64> = (0..39).map(|i| 1.0 + (i % 7) as f64 * 0.01).collect();
        values.push(5.0);
        let out = detect(&matrix(&values), 0.05);
        assert!(out.values().all(|r| r.method() == AnomalyMethod::Forest));
        assert!(out[&ProjectId::from("P39")].is_anomaly);
    }

    #[test]
    fn test_no_columns_still_scores_every_row() {
        for rows in [3usize, 12] {
            let mut m = MetricMatrix::new(Vec::new());
            for i in 0..rows {
                m.push_row(ProjectId::new(format!("P{i:02}")), vec![Some(1.0)]);
            }
            let out = detect(&m, 0.1);
            assert_eq!(out.len(), rows);
            assert!(out.values().all(|r| !r.is_anomaly));
        }

        let mut single = MetricMatrix::new(Vec::new());
        single.push_row(ProjectId::from("P1"), Vec::new());
        let out = detect_with(&single, &AnomalySettings::default());
        assert_eq!(out[&ProjectId::from("P1")].score, AnomalyScore::ZScore { score: 0 });
    }

    #[test]
    fn test_empty_matrix() {
        assert!(detect(&MetricMatrix::new(MetricColumn::DEFAULT.to_vec()), 0.1).is_empty());
    }
}
