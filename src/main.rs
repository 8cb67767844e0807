use std::sync::Arc;

use endpoint_stats::config::load_config;
use endpoint_stats::{server, AppState, MetricsCollector};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ─────────────────────────────────────────
    let cfg = load_config()?;

    // ── 2. Logging (RUST_LOG wins over the debug flag) ───────────
    let default_level = if cfg.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // ── 3. Build shared state ────────────────────────────────────
    let collector = MetricsCollector::from_config(&cfg.collector)?.with_hook(|key, entry| {
        tracing::trace!(
            endpoint = %key,
            count = entry.count,
            avg_ms = entry.average_duration,
            "endpoint stats updated"
        );
    });
    let state = Arc::new(AppState::new(Arc::new(collector), cfg.tracking.clone()));

    // ── 4. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state);

    // ── 5. Bind & serve ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;

    tracing::info!(
        listen = %cfg.listen_addr,
        max_endpoints = cfg.collector.max_endpoints,
        normalize_paths = cfg.tracking.normalize_paths,
        group_by_method = cfg.tracking.group_by_method,
        "endpoint-stats listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
