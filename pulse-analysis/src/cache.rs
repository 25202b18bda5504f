//! Caller-owned forecast cache.
//!
//! The engine never holds results between calls. A caller that wants reuse
//! keeps a [`ForecastCache`] and hands it back; staleness is decided by
//! timestamp comparison only.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::PortfolioAnalysis;

/// An analysis stamped with when it was generated and how long it is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastCache {
    pub analysis: PortfolioAnalysis,
    pub generated_at: DateTime<Utc>,
    pub validity_secs: u64,
}

impl ForecastCache {
    pub fn new(analysis: PortfolioAnalysis, generated_at: DateTime<Utc>, validity_secs: u64) -> Self {
        Self {
            analysis,
            generated_at,
            validity_secs,
        }
    }

    pub fn validity(&self) -> Duration {
        Duration::try_seconds(i64::try_from(self.validity_secs).unwrap_or(i64::MAX))
            .unwrap_or(Duration::MAX)
    }

    /// When the cached analysis stops being fresh, or `None` if that lies
    /// beyond the representable range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at.checked_add_signed(self.validity())
    }

    /// Fresh when `generated_at <= now < generated_at + validity`. A cache
    /// stamped in the future is treated as stale.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now >= self.generated_at && now - self.generated_at < self.validity()
    }

    /// The cached analysis if still fresh at `now`.
    pub fn fresh(&self, now: DateTime<Utc>) -> Option<&PortfolioAnalysis> {
        self.is_fresh(now).then_some(&self.analysis)
    }

    /// Seconds since generation (negative if stamped in the future).
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.generated_at).num_seconds()
    }
}
