//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health - Full health status including the latest bootstrap run

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::server::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: starting, healthy, degraded
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    /// Modules started by the latest run
    pub modules_started: usize,
    pub modules_failed: usize,
    pub last_run: Option<Uuid>,
}

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let report = state.report().await;

    let (status, started, failed, last_run) = match &report {
        None => ("starting", 0, 0, None),
        Some(r) => {
            let status = if r.failed.is_empty() && !r.cancelled {
                "healthy"
            } else {
                "degraded"
            };
            (status, r.started.len(), r.failed.len(), Some(r.run_id))
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        modules_started: started,
        modules_failed: failed,
        last_run,
    })
}
