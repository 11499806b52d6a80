// handlers/system.rs - root and health endpoints

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the newsdesk API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - probes the database and the cache
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = match state.db.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!("database health check failed: {}", e);
            false
        }
    };
    let cache = state.cache.health_check().await;

    let status = if database && cache {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "database": if database { "up" } else { "down" },
            "cache": if cache { "up" } else { "down" },
        })),
    )
}
