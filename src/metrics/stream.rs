use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use crate::AppState;

/// How often the SSE endpoint pushes a fresh summary
const STREAM_INTERVAL: Duration = Duration::from_secs(1);

// ─── GET /stats/stream ───────────────────────────────────────────
/// Server-Sent Events endpoint.
/// Pushes a full `StatsSummary` as JSON once per second. Event ids count
/// up from 0 so a client can tell when it missed a tick.

pub async fn summary_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let interval = tokio::time::interval(STREAM_INTERVAL);

    let mut tick = 0u64;
    let stream = IntervalStream::new(interval).map(move |_| {
        let json = serde_json::to_string(&state.metrics.summary()).unwrap_or_default();
        let event = Event::default()
            .event("summary")
            .id(tick.to_string())
            .data(json);
        tick += 1;
        Ok(event)
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
