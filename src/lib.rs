//! Per-endpoint request statistics for axum services.
//!
//! A bounded, LRU-evicting accumulator of request count and latency
//! (total / average / min / max), fed by a timing middleware and exposed
//! through ranked and aggregate queries.

use std::sync::Arc;

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;

pub use config::{CollectorConfig, Config, ConfigError, TrackingConfig};
pub use metrics::{MetricsCollector, RankedEndpoint, StatsEntry, StatsError, StatsSummary};

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Central accumulator. The middleware records, `/stats` routes read.
    pub metrics: Arc<MetricsCollector>,

    /// How the middleware turns a request into an endpoint key.
    pub tracking: TrackingConfig,
}

impl AppState {
    pub fn new(metrics: Arc<MetricsCollector>, tracking: TrackingConfig) -> Self {
        Self { metrics, tracking }
    }
}
