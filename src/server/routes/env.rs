//! GET {basePath}env - runtime environment for the module loader

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::host::EnvVars;
use crate::server::state::AppState;

pub async fn get_env(State(state): State<Arc<AppState>>) -> Json<EnvVars> {
    Json(state.env.as_ref().clone())
}
