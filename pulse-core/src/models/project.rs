//! Project record and lifecycle status.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::ProjectId;

/// Reported project status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    OnTrack,
    MinorIssues,
    AtRisk,
    Delayed,
    Completed,
}

impl ProjectStatus {
    pub const ALL: &'static [ProjectStatus] = &[
        Self::OnTrack,
        Self::MinorIssues,
        Self::AtRisk,
        Self::Delayed,
        Self::Completed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::OnTrack => "On Track",
            Self::MinorIssues => "Minor Issues",
            Self::AtRisk => "At Risk",
            Self::Delayed => "Delayed",
            Self::Completed => "Completed",
        }
    }

    /// At Risk and Delayed projects always need attention.
    pub fn is_flagged(&self) -> bool {
        matches!(self, Self::AtRisk | Self::Delayed)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    /// Case-insensitive; spaces, underscores, and hyphens are ignored, so
    /// "At Risk", "at_risk", and "AtRisk" all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "ontrack" => Ok(Self::OnTrack),
            "minorissues" => Ok(Self::MinorIssues),
            "atrisk" => Ok(Self::AtRisk),
            "delayed" => Ok(Self::Delayed),
            "completed" => Ok(Self::Completed),
            _ => Err(s.to_string()),
        }
    }
}

/// A validated project. Immutable for the duration of one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: Option<String>,
    /// Always > 0 after ingestion.
    pub budget: f64,
    pub planned_start: Option<NaiveDate>,
    /// Never before `planned_start` when both are present.
    pub planned_end: Option<NaiveDate>,
    pub status: ProjectStatus,
    /// Reported SPI, if the source carries one.
    pub spi: Option<f64>,
    /// Reported CPI, if the source carries one.
    pub cpi: Option<f64>,
    /// Actual cost to date, if reported at project level.
    pub actual_cost: Option<f64>,
    /// Percent complete, clamped to 0..=100.
    pub completion_pct: Option<f64>,
    /// Open risk count.
    pub risk_count: Option<u32>,
}

impl Project {
    /// Minimal constructor; optional fields start empty.
    pub fn new(id: impl Into<ProjectId>, budget: f64, status: ProjectStatus) -> Self {
        Self {
            id: id.into(),
            name: None,
            budget,
            planned_start: None,
            planned_end: None,
            status,
            spi: None,
            cpi: None,
            actual_cost: None,
            completion_pct: None,
            risk_count: None,
        }
    }

    pub fn with_window(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.planned_start = Some(start);
        self.planned_end = Some(end);
        self
    }

    pub fn with_indices(mut self, spi: f64, cpi: f64) -> Self {
        self.spi = Some(spi);
        self.cpi = Some(cpi);
        self
    }

    /// Both planned dates, or `None` when either is missing.
    pub fn planned_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.planned_start?, self.planned_end?))
    }

    /// Planned duration in whole days.
    pub fn planned_duration_days(&self) -> Option<i64> {
        self.planned_window()
            .map(|(start, end)| (end - start).num_days().max(0))
    }

    /// Display label: name when present, otherwise the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_is_lenient() {
        assert_eq!("At Risk".parse::<ProjectStatus>(), Ok(ProjectStatus::AtRisk));
        assert_eq!("at_risk".parse::<ProjectStatus>(), Ok(ProjectStatus::AtRisk));
        assert_eq!("OnTrack".parse::<ProjectStatus>(), Ok(ProjectStatus::OnTrack));
        assert_eq!("minor-issues".parse::<ProjectStatus>(), Ok(ProjectStatus::MinorIssues));
        assert!("Cancelled".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_flagged_statuses() {
        let flagged: Vec<_> = ProjectStatus::ALL.iter().filter(|s| s.is_flagged()).collect();
        assert_eq!(flagged, vec![&ProjectStatus::AtRisk, &ProjectStatus::Delayed]);
    }

    #[test]
    fn test_planned_window_requires_both_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut p = Project::new("P1", 100.0, ProjectStatus::OnTrack);
        p.planned_start = Some(start);
        assert!(p.planned_window().is_none());
        assert!(p.planned_duration_days().is_none());
    }
}
