//! Application State
//!
//! Shared state accessible by all handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::host::EnvVars;
use crate::loader::RunReport;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Environment served on the `env` endpoint
    pub env: Arc<EnvVars>,
    /// Path prefix the dashboard is mounted under
    pub base_path: String,
    /// Directory static files are served from
    pub root_dir: PathBuf,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Report of the latest bootstrap run
    report: Arc<RwLock<Option<RunReport>>>,
    /// Rendered dashboard page of the latest run
    page: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(env: EnvVars, base_path: impl Into<String>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            env: Arc::new(env),
            base_path: base_path.into(),
            root_dir: root_dir.into(),
            start_time: Instant::now(),
            report: Arc::new(RwLock::new(None)),
            page: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the latest run and its page
    pub async fn publish(&self, report: RunReport, page: String) {
        tracing::info!(
            run_id = %report.run_id,
            started = report.started.len(),
            failed = report.failed.len(),
            "Publishing bootstrap run"
        );
        *self.report.write().await = Some(report);
        *self.page.write().await = Some(page);
    }

    pub async fn report(&self) -> Option<RunReport> {
        self.report.read().await.clone()
    }

    pub async fn page(&self) -> Option<String> {
        self.page.read().await.clone()
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
