use axum::{
    body::Body,
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::StreamExt;

use super::key::endpoint_key;
use crate::AppState;

/// Tracing target for the optional per-request log line.
pub const REQUEST_LOG_TARGET: &str = "endpoint_stats::requests";

/// Tower-compatible middleware that times every request and feeds the
/// observation into the shared `MetricsCollector` once the response body
/// has been fully sent (or abandoned by the client). It also adds two headers:
///
///   X-Response-Time-Ms: time until the response head was ready
///   Server-Timing:      same value in the standard Server-Timing format
pub async fn timing_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let start = Instant::now();
    let response = next.run(req).await;
    let head_ms = start.elapsed().as_secs_f64() * 1000.0;

    let (mut parts, body) = response.into_parts();

    // ── Inject response headers ─────────────────────────────────
    if let Ok(val) = format!("{head_ms:.3}").parse() {
        parts.headers.insert("X-Response-Time-Ms", val);
    }
    if let Ok(val) = format!("total;dur={head_ms:.3}").parse() {
        parts.headers.insert("Server-Timing", val);
    }

    // ── Record exactly once, when the body is done ──────────────
    let guard = RecordOnFinish {
        key: endpoint_key(method.as_str(), &target, &state.tracking),
        status: parts.status.as_u16(),
        method,
        start,
        state,
    };
    let body = Body::from_stream(body.into_data_stream().map(move |chunk| {
        let _held = &guard;
        chunk
    }));

    Response::from_parts(parts, body)
}

/// Travels with the response body and reports the observation when the
/// body is dropped, i.e. after the last frame went out or the client left.
struct RecordOnFinish {
    state: Arc<AppState>,
    method: Method,
    key: String,
    status: u16,
    start: Instant,
}

impl Drop for RecordOnFinish {
    fn drop(&mut self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        let (method, key) = (self.method.as_str(), self.key.as_str());

        match self.state.metrics.record(method, key, ms) {
            Ok(count) if self.state.tracking.enable_logging => {
                tracing::info!(
                    target: REQUEST_LOG_TARGET,
                    status = self.status,
                    count,
                    "{method} {key} {ms:.3}ms"
                );
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(endpoint = %key, error = %err, "observation rejected");
            }
        }
    }
}
