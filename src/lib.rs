//! # mirrorhost
//!
//! Smart mirror host: resolves the configured dashboard modules, loads their
//! code and resources one module at a time, starts them all and tells the
//! host shell once everything has settled.
//!
//! ## Modules
//!
//! - [`modules`]: module data model, resolution, config merging, built-ins
//! - [`loader`]: file loading, sequential bootstrapping, the startup run
//! - [`host`]: host shell services (env vars, positions, module factory)
//! - [`server`]: HTTP endpoint for the env map, run report and page
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mirrorhost::host::{EnvSource, EnvVars, LocalShell};
//! use mirrorhost::loader::{Orchestrator, OrchestratorOptions, PageDocument};
//! use mirrorhost::modules::{builtin_registry, ModuleEntry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let shell = Arc::new(LocalShell::new(
//!         EnvSource::Static(EnvVars::default()),
//!         builtin_registry(),
//!     ));
//!     let document = Arc::new(PageDocument::new("."));
//!     let mut orchestrator =
//!         Orchestrator::new(shell, document.clone(), OrchestratorOptions::default());
//!
//!     let report = orchestrator
//!         .run(&[
//!             ModuleEntry::new("clock").position("top_left"),
//!             ModuleEntry::new("weather").position("top_right"),
//!         ])
//!         .await;
//!
//!     println!("{} modules started", report.started.len());
//!     println!("{}", document.render_html("MagicMirror²").await);
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod host;
pub mod loader;
pub mod logging;
pub mod modules;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use cancel::{CancellationToken, CancelledError};

pub use config::{Config, ConfigError, LoaderConfig, LoggingConfig, ServerConfig};

pub use host::{EnvClient, EnvClientConfig, EnvSource, EnvVars, HostError, HostShell, LocalShell, ShellEvent};

pub use loader::{
    Document, FileLoader, LoadOutcome, LoaderError, LoaderResult, Orchestrator,
    OrchestratorOptions, PageDocument, ResourceKind, RunReport,
};

pub use modules::{
    builtin_registry, DashboardModule, MergeStrategy, ModuleDescriptor, ModuleEntry, ModuleError,
    ModuleInstance, ModuleRegistry, ModuleResolver, ModuleState,
};

pub use server::{build_router, serve, AppState, ServerError};
