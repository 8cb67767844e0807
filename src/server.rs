use axum::{
    middleware as axum_mw,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::metrics::stream;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Demo endpoints ──────────────────────────────────────
        .route("/api/health", get(handlers::demo::health))
        .route("/api/items/:id", get(handlers::demo::get_item))
        .route("/api/slow/:ms", get(handlers::demo::slow))
        // ── Statistics ──────────────────────────────────────────
        .route(
            "/stats",
            get(handlers::stats::get_summary).delete(handlers::stats::reset_stats),
        )
        .route("/stats/stream", get(stream::summary_stream))
        .route("/stats/endpoints", get(handlers::stats::list_endpoints))
        .route(
            "/stats/endpoints/top",
            get(handlers::stats::top_endpoints),
        )
        .route("/stats/endpoint", get(handlers::stats::get_endpoint))
        // ── Provide shared state to all routes above ────────────
        .with_state(state.clone())
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn_with_state(state, timing::timing_middleware))
        .layer(CorsLayer::permissive())
}
