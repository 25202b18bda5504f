//! Threshold-based attention list.

use pulse_core::constants::NEUTRAL_INDEX;
use pulse_core::models::{AttentionEntry, AttentionReason, CurrentMetrics, Project};
use pulse_core::types::collections::{BTreeMap, SmallVec3};
use pulse_core::types::ProjectId;

/// `0.5*(1-spi) + 0.5*(1-cpi)`; higher is worse.
pub fn risk_score(spi: f64, cpi: f64) -> f64 {
    0.5 * (1.0 - spi) + 0.5 * (1.0 - cpi)
}

fn finite_or_neutral(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(NEUTRAL_INDEX)
}

/// Projects below either threshold or with a flagged status, worst first.
///
/// Projects without metrics are treated as on plan (1.0/1.0). Equal risk
/// scores keep input order.
pub fn filter_attention(
    projects: &[Project],
    latest: &BTreeMap<ProjectId, CurrentMetrics>,
    spi_threshold: f64,
    cpi_threshold: f64,
) -> Vec<AttentionEntry> {
    let mut entries: Vec<AttentionEntry> = projects
        .iter()
        .filter_map(|project| {
            let metrics = latest.get(&project.id);
            let spi = finite_or_neutral(metrics.map(|m| m.spi));
            let cpi = finite_or_neutral(metrics.map(|m| m.cpi));

            let mut reasons = SmallVec3::new();
            if spi < spi_threshold {
                reasons.push(AttentionReason::ScheduleBelowThreshold);
            }
            if cpi < cpi_threshold {
                reasons.push(AttentionReason::CostBelowThreshold);
            }
            if project.status.is_flagged() {
                reasons.push(AttentionReason::StatusFlagged);
            }
            if reasons.is_empty() {
                return None;
            }

            Some(AttentionEntry {
                project_id: project.id.clone(),
                status: project.status,
                spi,
                cpi,
                risk_score: risk_score(spi, cpi),
                reasons,
            })
        })
        .collect();

    // Stable: ties stay in input order.
    entries.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    entries
}
