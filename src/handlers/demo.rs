use axum::{extract::Path, Json};
use serde::Serialize;
use std::time::Duration;

use super::AppError;

/// Upper bound for `/api/slow/:ms` so a typo can't park a task forever
const MAX_SLEEP_MS: u64 = 5_000;

#[derive(Debug, Serialize)]
pub struct Item {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Slept {
    pub slept_ms: u64,
}

// ─── GET /api/health ─────────────────────────────────────────────

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ─── GET /api/items/:id ──────────────────────────────────────────

/// Ids are opaque strings (numbers, UUIDs, slugs). `0` is never stocked.
pub async fn get_item(Path(id): Path<String>) -> Result<Json<Item>, AppError> {
    if id == "0" {
        return Err(AppError::NotFound("item '0' not found".into()));
    }
    Ok(Json(Item {
        name: format!("item-{id}"),
        id,
    }))
}

// ─── GET /api/slow/:ms ───────────────────────────────────────────

pub async fn slow(Path(ms): Path<u64>) -> Result<Json<Slept>, AppError> {
    if ms > MAX_SLEEP_MS {
        return Err(AppError::BadRequest(format!(
            "ms must be at most {MAX_SLEEP_MS}"
        )));
    }
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Ok(Json(Slept { slept_ms: ms }))
}
