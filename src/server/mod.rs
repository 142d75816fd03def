//! Host HTTP server
//!
//! Serves what the module loader and the browser need from the host,
//! built with Axum.
//!
//! # Endpoints
//!
//! ## Dashboard (under the configured base path)
//! - `GET {basePath}` - The rendered dashboard page
//! - `GET {basePath}env` - Runtime environment (`modulesDir`, `customCss`, ...)
//! - anything else - Static files from the root directory
//!
//! ## API
//! - `GET /api/v1/modules` - Report of the latest bootstrap run
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Full health status

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ServerError, ServerResult};
pub use state::AppState;

use axum::{routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::host::normalize_base_path;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let base_path = normalize_base_path(&state.base_path);

    let dashboard_routes = Router::new()
        .route("/", get(routes::page::index))
        .route("/env", get(routes::env::get_env))
        .fallback_service(ServeDir::new(&state.root_dir));

    let api_routes = Router::new().route("/modules", get(routes::modules::latest_run));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    let router = Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes);

    // `{basePath}` is normalized with a trailing slash; serve the page with and without it
    let router = if base_path == "/" {
        router.merge(dashboard_routes)
    } else {
        router
            .route(&base_path, get(routes::page::index))
            .nest(base_path.trim_end_matches('/'), dashboard_routes)
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> ServerResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(state);

    let addr = listener.local_addr()?;
    tracing::info!("mirrorhost listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("mirrorhost shut down gracefully");
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
