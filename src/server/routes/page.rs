//! GET {basePath} - the rendered dashboard page

use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::server::error::{ServerError, ServerResult};
use crate::server::state::AppState;

pub async fn index(State(state): State<Arc<AppState>>) -> ServerResult<Html<String>> {
    state
        .page()
        .await
        .map(Html)
        .ok_or_else(|| ServerError::NotReady("modules are still loading".to_string()))
}
