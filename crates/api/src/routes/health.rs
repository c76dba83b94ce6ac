//! Liveness endpoint, mounted at the root rather than under `/api/v1`.

use std::time::Instant;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"ok"`, or `"degraded"` when the document store does not answer.
    pub status: &'static str,
    pub version: &'static str,
    pub store_healthy: bool,
    /// Round-trip time of the store ping.
    pub store_latency_ms: u64,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let started = Instant::now();
    let ping = state.store.ping().await;
    let store_latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if let Err(e) = &ping {
        tracing::warn!(error = %e, "Health check: document store unreachable");
    }

    Json(HealthResponse {
        status: if ping.is_ok() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        store_healthy: ping.is_ok(),
        store_latency_ms,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
