//! The project × metric matrix the anomaly pass scores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use pulse_core::types::ProjectId;

/// A metric column. The default set is all four, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricColumn {
    Spi,
    Cpi,
    BudgetVariancePct,
    ScheduleVarianceDays,
}

impl MetricColumn {
    pub const DEFAULT: &'static [MetricColumn] = &[
        Self::Spi,
        Self::Cpi,
        Self::BudgetVariancePct,
        Self::ScheduleVarianceDays,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Spi => "spi",
            Self::Cpi => "cpi",
            Self::BudgetVariancePct => "budget_variance_pct",
            Self::ScheduleVarianceDays => "schedule_variance_days",
        }
    }

    /// Resolve configured column names. Unknown names are skipped with a
    /// warning; an empty result falls back to [`MetricColumn::DEFAULT`].
    pub fn resolve(names: &[String]) -> Vec<MetricColumn> {
        let mut columns = Vec::new();
        for name in names {
            match name.parse::<MetricColumn>() {
                Ok(col) if !columns.contains(&col) => columns.push(col),
                Ok(_) => {}
                Err(()) => tracing::warn!(column = %name, "unknown anomaly metric ignored"),
            }
        }
        if columns.is_empty() {
            Self::DEFAULT.to_vec()
        } else {
            columns
        }
    }
}

impl fmt::Display for MetricColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricColumn {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::DEFAULT
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Rows are projects in input order; a `None` cell is a value the project
/// could not supply (e.g. no forecast).
#[derive(Debug, Clone, Default)]
pub struct MetricMatrix {
    columns: Vec<MetricColumn>,
    ids: Vec<ProjectId>,
    rows: Vec<Vec<Option<f64>>>,
}

impl MetricMatrix {
    pub fn new(columns: Vec<MetricColumn>) -> Self {
        Self {
            columns,
            ids: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing cells become `None`, extra cells are
    /// dropped, and non-finite values count as missing.
    pub fn push_row(&mut self, id: ProjectId, mut cells: Vec<Option<f64>>) {
        cells.resize(self.columns.len(), None);
        for cell in &mut cells {
            *cell = cell.filter(|v| v.is_finite());
        }
        self.ids.push(id);
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[MetricColumn] {
        &self.columns
    }

    pub fn ids(&self) -> &[ProjectId] {
        &self.ids
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column-major values with missing cells replaced by the column mean
    /// (0 when the whole column is missing). Shape never changes.
    pub fn filled_columns(&self) -> Vec<Vec<f64>> {
        (0..self.columns.len())
            .map(|c| {
                let present: Vec<f64> = self.rows.iter().filter_map(|r| r[c]).collect();
                let fill = if present.is_empty() {
                    0.0
                } else {
                    present.iter().sum::<f64>() / present.len() as f64
                };
                self.rows.iter().map(|r| r[c].unwrap_or(fill)).collect()
            })
            .collect()
    }
}
