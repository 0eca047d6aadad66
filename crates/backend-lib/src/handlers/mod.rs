// ============================
// goaltrack-backend-lib/src/handlers/mod.rs
// ============================
//! HTTP request handlers.

pub mod auth;
pub mod goals;

use axum::Json;

/// Liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
