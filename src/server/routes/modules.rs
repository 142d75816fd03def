//! GET /api/v1/modules - report of the latest bootstrap run

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::loader::RunReport;
use crate::server::error::{ServerError, ServerResult};
use crate::server::state::AppState;

pub async fn latest_run(State(state): State<Arc<AppState>>) -> ServerResult<Json<RunReport>> {
    state
        .report()
        .await
        .map(Json)
        .ok_or_else(|| ServerError::NotReady("no bootstrap run has finished".to_string()))
}
