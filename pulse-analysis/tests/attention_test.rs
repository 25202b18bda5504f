//! Attention ranking and insight banding.

use proptest::prelude::*;

use pulse_analysis::attention::{filter_attention, risk_score};
use pulse_analysis::insights::{portfolio_insights, PerformanceBand};
use pulse_analysis::metrics::aggregate_portfolio;
use pulse_core::models::{
    AttentionReason, CurrentMetrics, HistoryRecord, PortfolioDataset, Project, ProjectStatus,
};
use pulse_core::types::collections::BTreeMap;
use pulse_core::types::{MonthKey, ProjectId};

fn latest(rows: &[(&str, f64, f64)]) -> BTreeMap<ProjectId, CurrentMetrics> {
    rows.iter()
        .map(|&(id, spi, cpi)| {
            (
                ProjectId::from(id),
                CurrentMetrics {
                    spi,
                    cpi,
                    ..CurrentMetrics::neutral()
                },
            )
        })
        .collect()
}

#[test]
fn test_ranked_example() {
    let projects: Vec<Project> = ["project1", "project2", "project3"]
        .iter()
        .map(|id| Project::new(*id, 100.0, ProjectStatus::OnTrack))
        .collect();
    let metrics = latest(&[
        ("project1", 0.70, 1.00),
        ("project2", 0.95, 0.80),
        ("project3", 1.05, 1.00),
    ]);

    let list = filter_attention(&projects, &metrics, 0.9, 0.9);
    let ids: Vec<&str> = list.iter().map(|e| e.project_id.as_str()).collect();
    assert_eq!(ids, vec!["project1", "project2"]);
    assert!((list[0].risk_score - 0.15).abs() < 1e-12);
    assert_eq!(list[1].reasons.as_slice(), &[AttentionReason::CostBelowThreshold]);
}

#[test]
fn test_all_reasons_recorded() {
    let projects = vec![Project::new("p", 1.0, ProjectStatus::Delayed)];
    let list = filter_attention(&projects, &latest(&[("p", 0.5, 0.5)]), 0.9, 0.9);
    assert_eq!(
        list[0].reasons.as_slice(),
        &[
            AttentionReason::ScheduleBelowThreshold,
            AttentionReason::CostBelowThreshold,
            AttentionReason::StatusFlagged,
        ]
    );
}

#[test]
fn test_band_boundaries_belong_to_higher_band() {
    assert_eq!(PerformanceBand::from_index(1.1), PerformanceBand::Excellent);
    assert_eq!(PerformanceBand::from_index(1.0), PerformanceBand::Good);
    assert_eq!(PerformanceBand::from_index(0.9), PerformanceBand::Acceptable);
    assert_eq!(PerformanceBand::from_index(0.8), PerformanceBand::Concerning);
    assert!(PerformanceBand::Excellent > PerformanceBand::Critical);
}

#[test]
fn test_portfolio_rollup_and_insights() {
    let month = |m| MonthKey::new(2024, m).unwrap();
    let projects = vec![
        Project::new("a", 100.0, ProjectStatus::AtRisk),
        Project::new("b", 100.0, ProjectStatus::Completed),
        Project::new("c", 100.0, ProjectStatus::OnTrack),
    ];
    let history = vec![
        HistoryRecord::new("a", month(1), 0.9, 0.9),
        HistoryRecord::new("a", month(2), 0.7, 0.8),
        HistoryRecord::new("b", month(2), 0.8, 0.9),
    ];
    let dataset = PortfolioDataset::from_records(projects, vec![], history).data;
    let portfolio = aggregate_portfolio(&dataset);

    assert!((portfolio.avg_spi - 0.75).abs() < 1e-12);
    assert!((portfolio.spi_change + 0.15).abs() < 1e-12);
    assert_eq!(portfolio.total_projects, 3);
    assert_eq!(portfolio.active_projects, 2);
    assert_eq!(portfolio.at_risk_projects, 1);
    assert_eq!(portfolio.reporting_projects, 2);

    let insights = portfolio_insights(&portfolio, &BTreeMap::new(), &BTreeMap::new());
    assert_eq!(insights[0], "1 of 3 projects (33%) are At Risk or Delayed.");
    assert!(insights[1].contains("average SPI 0.75"));
}

#[test]
fn test_empty_portfolio_defaults() {
    let portfolio = aggregate_portfolio(&PortfolioDataset::default());
    assert_eq!(portfolio.avg_spi, 1.0);
    assert_eq!(portfolio.cpi_change, 0.0);
    assert_eq!(portfolio.total_projects, 0);
}

proptest! {
    #[test]
    fn ranking_is_non_increasing(
        rows in proptest::collection::vec((0.0f64..1.5, 0.0f64..1.5, any::<bool>()), 0..30),
        spi_threshold in 0.7f64..1.0,
        cpi_threshold in 0.7f64..1.0,
    ) {
        let ids: Vec<String> = (0..rows.len()).map(|i| format!("p{i}")).collect();
        let projects: Vec<Project> = rows
            .iter()
            .zip(&ids)
            .map(|(&(_, _, flagged), id)| {
                let status = if flagged { ProjectStatus::AtRisk } else { ProjectStatus::OnTrack };
                Project::new(id.as_str(), 1.0, status)
            })
            .collect();
        let metrics: BTreeMap<ProjectId, CurrentMetrics> = rows
            .iter()
            .zip(&ids)
            .map(|(&(spi, cpi, _), id)| {
                (ProjectId::from(id.as_str()), CurrentMetrics { spi, cpi, ..CurrentMetrics::neutral() })
            })
            .collect();

        let list = filter_attention(&projects, &metrics, spi_threshold, cpi_threshold);
        for pair in list.windows(2) {
            prop_assert!(pair[0].risk_score >= pair[1].risk_score);
        }
        for entry in &list {
            prop_assert!((entry.risk_score - risk_score(entry.spi, entry.cpi)).abs() < 1e-12);
            prop_assert!(
                entry.spi < spi_threshold || entry.cpi < cpi_threshold || entry.status.is_flagged()
            );
        }
        let expected = rows
            .iter()
            .filter(|&&(spi, cpi, flagged)| spi < spi_threshold || cpi < cpi_threshold || flagged)
            .count();
        prop_assert_eq!(list.len(), expected);
    }
}
