use std::cmp::Ordering;

use serde::Serialize;

use super::collector::MetricsCollector;
use super::StatsEntry;

/// One endpoint in a ranked listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEndpoint {
    pub key: String,
    pub stats: StatsEntry,
}

/// Aggregate view over every tracked endpoint, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_endpoints: usize,
    pub total_requests: u64,
    pub total_duration: f64,
    /// `total_duration / total_requests`, or 0 when nothing was recorded
    pub average_duration: f64,
    pub top_endpoint: Option<RankedEndpoint>,
    pub slowest_endpoint: Option<RankedEndpoint>,
}

impl MetricsCollector {
    /// Busiest endpoints first. Equal counts keep insertion order.
    pub fn top_by_count(&self, limit: usize) -> Vec<RankedEndpoint> {
        rank(self.entries_in_insertion_order(), limit, |a, b| {
            b.count.cmp(&a.count)
        })
    }

    /// Slowest endpoints (by mean latency) first. Ties keep insertion order.
    pub fn top_by_average_duration(&self, limit: usize) -> Vec<RankedEndpoint> {
        rank(self.entries_in_insertion_order(), limit, |a, b| {
            b.average_duration.total_cmp(&a.average_duration)
        })
    }

    pub fn summary(&self) -> StatsSummary {
        let entries = self.entries_in_insertion_order();

        let total_requests: u64 = entries.iter().map(|(_, e)| e.count).sum();
        let total_duration: f64 = entries.iter().map(|(_, e)| e.total_duration).sum();
        let average_duration = if total_requests > 0 {
            total_duration / total_requests as f64
        } else {
            0.0
        };

        StatsSummary {
            total_endpoints: entries.len(),
            total_requests,
            total_duration,
            average_duration,
            top_endpoint: rank(entries.clone(), 1, |a, b| b.count.cmp(&a.count))
                .into_iter()
                .next(),
            slowest_endpoint: rank(entries, 1, |a, b| {
                b.average_duration.total_cmp(&a.average_duration)
            })
            .into_iter()
            .next(),
        }
    }
}

/// Stable sort (so ties keep the incoming order), then truncate.
fn rank<F>(
    mut entries: Vec<(String, StatsEntry)>,
    limit: usize,
    cmp: F,
) -> Vec<RankedEndpoint>
where
    F: Fn(&StatsEntry, &StatsEntry) -> Ordering,
{
    if limit == 0 {
        return Vec::new();
    }
    entries.sort_by(|(_, a), (_, b)| cmp(a, b));
    entries.truncate(limit);
    entries
        .into_iter()
        .map(|(key, stats)| RankedEndpoint { key, stats })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ranked: &[RankedEndpoint]) -> Vec<&str> {
        ranked.iter().map(|r| r.key.as_str()).collect()
    }

    fn seeded() -> MetricsCollector {
        let c = MetricsCollector::new();
        // counts: /b=3, /c=2, /a=1
        c.record("GET", "/a", 50.0).unwrap();
        for d in [10.0, 20.0, 30.0] {
            c.record("GET", "/b", d).unwrap();
        }
        for d in [5.0, 5.0] {
            c.record("POST", "/c", d).unwrap();
        }
        c
    }

    // ===== Ranking =====

    #[test]
    fn test_top_by_count_descending_and_truncated() {
        let c = seeded();
        let top = c.top_by_count(2);
        assert_eq!(keys(&top), vec!["/b", "/c"]);
        assert_eq!(top[0].stats.count, 3);
        assert_eq!(top[1].stats.count, 2);
    }

    #[test]
    fn test_top_by_average_duration_descending() {
        let c = seeded();
        assert_eq!(keys(&c.top_by_average_duration(10)), vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_zero_limit_is_empty() {
        let c = seeded();
        assert!(c.top_by_count(0).is_empty());
        assert!(c.top_by_average_duration(0).is_empty());
    }

    #[test]
    fn test_limit_larger_than_store_returns_everything() {
        let c = seeded();
        assert_eq!(c.top_by_count(100).len(), 3);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let c = MetricsCollector::new();
        for key in ["/z", "/m", "/a", "/q"] {
            c.record("GET", key, 7.0).unwrap();
        }
        assert_eq!(keys(&c.top_by_count(4)), vec!["/z", "/m", "/a", "/q"]);
        assert_eq!(
            keys(&c.top_by_average_duration(4)),
            vec!["/z", "/m", "/a", "/q"]
        );
    }

    #[test]
    fn test_ranking_on_empty_store() {
        let c = MetricsCollector::new();
        assert!(c.top_by_count(5).is_empty());
        assert!(c.top_by_average_duration(5).is_empty());
    }

    // ===== Summary =====

    #[test]
    fn test_summary_empty_store_is_all_zero() {
        let s = MetricsCollector::new().summary();
        assert_eq!(s.total_endpoints, 0);
        assert_eq!(s.total_requests, 0);
        assert_eq!(s.total_duration, 0.0);
        assert_eq!(s.average_duration, 0.0);
        assert!(s.top_endpoint.is_none());
        assert!(s.slowest_endpoint.is_none());
    }

    #[test]
    fn test_summary_aggregates_all_entries() {
        let s = seeded().summary();
        assert_eq!(s.total_endpoints, 3);
        assert_eq!(s.total_requests, 6);
        assert_eq!(s.total_duration, 120.0);
        assert_eq!(s.average_duration, 20.0);
        assert_eq!(s.top_endpoint.unwrap().key, "/b");
        assert_eq!(s.slowest_endpoint.unwrap().key, "/a");
    }

    #[test]
    fn test_summary_tracks_reset() {
        let c = seeded();
        c.reset(Some("/b"));
        let s = c.summary();
        assert_eq!(s.total_endpoints, 2);
        assert_eq!(s.total_requests, 3);
        assert_eq!(s.top_endpoint.unwrap().key, "/c");
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let json = serde_json::to_value(seeded().summary()).unwrap();
        assert_eq!(json["totalRequests"], 6);
        assert_eq!(json["topEndpoint"]["key"], "/b");
        assert_eq!(json["topEndpoint"]["stats"]["averageDuration"], 20.0);
        assert!(json["slowestEndpoint"]["stats"]["lastAccessedAt"].is_string());
    }
}
