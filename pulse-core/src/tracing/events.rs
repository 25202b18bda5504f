//! Structured log events for engine milestones.
//!
//! Field names are stable (`projects_forecast`, `projects_skipped`,
//! `anomalies_flagged`, `attention_count`, `forecast_duration_ms`,
//! `cache_hit`) so log queries can rely on them across releases.

/// A batch analysis finished.
pub fn batch_completed(
    projects_forecast: usize,
    projects_skipped: usize,
    anomalies_flagged: usize,
    attention_count: usize,
    forecast_duration_ms: u64,
) {
    tracing::info!(
        event = "batch_completed",
        projects_forecast,
        projects_skipped,
        anomalies_flagged,
        attention_count,
        forecast_duration_ms,
        "portfolio analysis completed"
    );
}

/// A project produced no forecast.
pub fn project_skipped(project_id: &str, code: &str, reason: &str) {
    tracing::debug!(
        event = "project_skipped",
        project_id = %project_id,
        code = %code,
        reason = %reason,
        "project skipped"
    );
}

/// A caller-supplied cache was checked for reuse.
pub fn cache_checked(cache_hit: bool, age_secs: i64) {
    tracing::info!(
        event = "cache_checked",
        cache_hit,
        age_secs,
        "forecast cache checked"
    );
}
