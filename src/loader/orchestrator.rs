//! Startup Coordinator
//!
//! [`Orchestrator::run`] is the single entry point of a bootstrap run:
//!
//! ```text
//! env + positions → resolve → bootstrap (sequential) → custom.css
//!     → start all (concurrent, all-settled) → modules_started → hide
//! ```
//!
//! No error escapes a run. Every failure is logged where it happens and
//! summarized in the returned [`RunReport`].

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use super::bootstrap::Bootstrapper;
use super::document::Document;
use super::file::FileLoader;
use super::registry::{default_vendor_map, LoadedFileRegistry};
use crate::cancel::CancellationToken;
use crate::config::LoaderConfig;
use crate::host::{EnvVars, HostShell};
use crate::modules::{ModuleEntry, ModuleInstance, ModuleResolver, ModuleStatus, RejectedModule};

/// Settings for a bootstrap run
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Directory resources are read from
    pub root_dir: PathBuf,
    /// Interface language for translations
    pub language: String,
    /// Vendor aliases → path below `vendor/`
    pub vendor: HashMap<String, String>,
    /// Bound on a single script or stylesheet load
    pub load_timeout: Duration,
    /// Bound on each module bootstrap hook
    pub hook_timeout: Duration,
    /// Bound on each module start
    pub start_timeout: Duration,
    /// Host modules loaded between the notification module and the configured ones
    pub system_modules: Vec<ModuleEntry>,
    pub resolver: ModuleResolver,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            language: "en".to_string(),
            vendor: default_vendor_map(),
            load_timeout: Duration::from_secs(10),
            hook_timeout: Duration::from_secs(30),
            start_timeout: Duration::from_secs(30),
            system_modules: Vec::new(),
            resolver: ModuleResolver::default(),
        }
    }
}

impl From<&LoaderConfig> for OrchestratorOptions {
    fn from(config: &LoaderConfig) -> Self {
        let mut vendor = default_vendor_map();
        vendor.extend(config.vendor.clone());

        Self {
            root_dir: PathBuf::from(&config.root_dir),
            language: config.language.clone(),
            vendor,
            load_timeout: Duration::from_millis(config.load_timeout_ms),
            hook_timeout: Duration::from_millis(config.hook_timeout_ms),
            start_timeout: Duration::from_millis(config.start_timeout_ms),
            system_modules: config.system_modules.clone(),
            resolver: ModuleResolver::new()
                .default_modules_dir(config.default_modules_dir.clone())
                .shadow_defaults(config.shadow_default_modules),
        }
    }
}

/// A module whose start failed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartFailure {
    pub identifier: String,
    pub name: String,
    pub error: String,
}

/// Summary of one bootstrap run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Descriptors that survived resolution
    pub resolved: usize,
    pub rejected: Vec<RejectedModule>,
    /// Instances created by the bootstrapper
    pub bootstrapped: usize,
    /// Identifiers of modules whose start succeeded
    pub started: Vec<String>,
    pub failed: Vec<StartFailure>,
    pub hidden: Vec<String>,
    pub modules: Vec<ModuleStatus>,
    pub cancelled: bool,
}

impl RunReport {
    pub(crate) fn new(run_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            started_at: now,
            finished_at: now,
            resolved: 0,
            rejected: Vec::new(),
            bootstrapped: 0,
            started: Vec::new(),
            failed: Vec::new(),
            hidden: Vec::new(),
            modules: Vec::new(),
            cancelled: false,
        }
    }
}

/// Owns the state of bootstrap runs: loaded files and live instances
pub struct Orchestrator {
    shell: Arc<dyn HostShell>,
    document: Arc<dyn Document>,
    options: OrchestratorOptions,
    cancel: CancellationToken,
    files: LoadedFileRegistry,
    instances: Vec<ModuleInstance>,
}

impl Orchestrator {
    pub fn new(
        shell: Arc<dyn HostShell>,
        document: Arc<dyn Document>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            shell,
            document,
            options,
            cancel: CancellationToken::new(),
            files: LoadedFileRegistry::new(),
            instances: Vec::new(),
        }
    }

    /// Token that cancels the in-flight run, or the next one if none is running
    ///
    /// A run that observed cancellation replaces the token, so later runs
    /// start clean and need a fresh token.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Live module instances, in load order
    pub fn instances(&self) -> &[ModuleInstance] {
        &self.instances
    }

    pub fn files(&self) -> &LoadedFileRegistry {
        &self.files
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    /// Resolve, bootstrap and start the configured modules
    pub async fn run(&mut self, configured: &[ModuleEntry]) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("bootstrap", %run_id);
        let report = self.run_inner(run_id, configured).instrument(span).await;

        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        report
    }

    async fn run_inner(&mut self, run_id: Uuid, configured: &[ModuleEntry]) -> RunReport {
        let mut report = RunReport::new(run_id);

        let env = match self.shell.fetch_env_vars().await {
            Ok(env) => env,
            Err(e) => {
                tracing::error!("Failed to fetch environment variables: {} (using defaults)", e);
                EnvVars::default()
            }
        };
        let positions = self.shell.available_positions();

        let resolution = self.options.resolver.resolve(
            configured,
            &self.options.system_modules,
            &env,
            &positions,
        );
        report.resolved = resolution.descriptors.len();
        report.rejected = resolution.rejected;
        tracing::info!(
            "Resolved {} modules ({} rejected)",
            report.resolved,
            report.rejected.len()
        );

        let loader = FileLoader::new(
            Arc::clone(&self.document),
            self.options.load_timeout,
            self.cancel.clone(),
        );

        let first = self.instances.len();
        let instances = Bootstrapper::new(
            self.shell.as_ref(),
            &loader,
            &mut self.files,
            &self.options,
        )
        .load_modules(resolution.descriptors)
        .await;
        report.bootstrapped = instances.len();
        self.instances.extend(instances);

        if self.cancel.is_cancelled() {
            tracing::warn!("Run cancelled before start phase");
            report.cancelled = true;
            return self.finish(report, first);
        }

        // After every module stylesheet so user overrides win
        loader.load_file(&env.custom_css).await;

        self.start_modules(first, &mut report).await;
        self.finish(report, first)
    }

    /// Start every instance from `first` on concurrently and settle all of them
    async fn start_modules(&mut self, first: usize, report: &mut RunReport) {
        let timeout = self.options.start_timeout;
        let batch = &mut self.instances[first..];

        let results = join_all(batch.iter_mut().map(|instance| instance.start(timeout))).await;

        for (instance, result) in batch.iter().zip(results) {
            match result {
                Ok(()) => report.started.push(instance.identifier().to_string()),
                Err(e) => {
                    tracing::error!("Error when starting module {}: {}", instance.name(), e);
                    report.failed.push(StartFailure {
                        identifier: instance.identifier().to_string(),
                        name: instance.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Started {} modules ({} failed)",
            report.started.len(),
            report.failed.len()
        );
        self.shell.modules_started(batch);

        for instance in batch.iter_mut() {
            if instance.descriptor().hidden_on_startup {
                tracing::info!("Initially hiding {}", instance.name());
                instance.hide();
                report.hidden.push(instance.identifier().to_string());
            }
        }
    }

    fn finish(&self, mut report: RunReport, first: usize) -> RunReport {
        report.modules = self.instances[first..].iter().map(|i| i.status()).collect();
        report.finished_at = Utc::now();
        report
    }
}
