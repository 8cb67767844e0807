pub mod collector;
pub mod ranking;
pub mod stream;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use collector::{MetricsCollector, StatsError, UpdateHook};
pub use ranking::{RankedEndpoint, StatsSummary};

/// Running latency statistics for one endpoint key.
/// Queries hand out clones of these, never the live record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsEntry {
    /// Observations recorded for this key (always ≥ 1)
    pub count: u64,
    /// Sum of all recorded durations (ms)
    pub total_duration: f64,
    /// `total_duration / count`, refreshed on every update
    pub average_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    /// Wall-clock time of the most recent observation
    pub last_accessed_at: DateTime<Utc>,
    /// Method seen on the first observation; later ones never overwrite it
    pub method: String,
    /// The endpoint key itself
    pub path: String,
}

impl StatsEntry {
    /// Fresh entry with extrema primed so the first observation sets both.
    fn new(method: &str, path: &str, now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            total_duration: 0.0,
            average_duration: 0.0,
            min_duration: f64::INFINITY,
            max_duration: f64::NEG_INFINITY,
            last_accessed_at: now,
            method: method.to_owned(),
            path: path.to_owned(),
        }
    }

    /// Fold one observation into the running totals.
    fn observe(&mut self, duration_ms: f64, now: DateTime<Utc>) {
        self.count += 1;
        self.total_duration += duration_ms;
        self.min_duration = self.min_duration.min(duration_ms);
        self.max_duration = self.max_duration.max(duration_ms);
        // Summation rounding can push the mean an ulp past an extremum
        self.average_duration = (self.total_duration / self.count as f64)
            .clamp(self.min_duration, self.max_duration);
        self.last_accessed_at = now;
    }
}
