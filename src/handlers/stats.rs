use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::metrics::{RankedEndpoint, StatsEntry, StatsSummary};
use crate::AppState;

use super::AppError;

// ─── Request types ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    #[default]
    Count,
    Duration,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    #[serde(default)]
    pub by: RankBy,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

// ─── GET /stats ──────────────────────────────────────────────────

pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<StatsSummary> {
    Json(state.metrics.summary())
}

// ─── GET /stats/endpoints ────────────────────────────────────────

pub async fn list_endpoints(
    State(state): State<Arc<AppState>>,
) -> Json<HashMap<String, StatsEntry>> {
    Json(state.metrics.get_all())
}

// ─── GET /stats/endpoints/top ────────────────────────────────────

pub async fn top_endpoints(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopQuery>,
) -> Json<Vec<RankedEndpoint>> {
    let ranked = match query.by {
        RankBy::Count => state.metrics.top_by_count(query.limit),
        RankBy::Duration => state.metrics.top_by_average_duration(query.limit),
    };
    Json(ranked)
}

// ─── GET /stats/endpoint?key=… ───────────────────────────────────

pub async fn get_endpoint(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<StatsEntry>, AppError> {
    let key = query
        .key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing `key` query parameter".into()))?;

    state
        .metrics
        .get(&key)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("endpoint '{key}' is not tracked")))
}

// ─── DELETE /stats[?key=…] ───────────────────────────────────────

pub async fn reset_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeyQuery>,
) -> StatusCode {
    let key = query.key.filter(|k| !k.is_empty());
    state.metrics.reset(key.as_deref());
    match &key {
        Some(key) => tracing::info!(endpoint = %key, "endpoint stats reset"),
        None => tracing::info!("all endpoint stats reset"),
    }
    StatusCode::NO_CONTENT
}
