//! Dashboard modules
//!
//! This module defines what a dashboard module is and how configured
//! modules become live instances:
//!
//! - **descriptor**: configured entries and resolved descriptors
//! - **merge**: instance config over module defaults
//! - **resolver**: entry list → validated descriptors
//! - **registry**: module name → factory
//! - **builtin**: the modules shipped with the host
//! - **translator**: translation tables
//!
//! # Lifecycle
//!
//! ```text
//! Resolved → CodeLoaded → Instantiated → ConfigMerged → ResourcesLoaded → Started → Hidden
//! ```

pub mod builtin;
pub mod descriptor;
pub mod merge;
pub mod registry;
pub mod resolver;
pub mod translator;

pub use builtin::{builtin_registry, ModuleSpec, StandardModule};
pub use descriptor::{default_positions, ModuleDescriptor, ModuleEntry, DEFAULT_POSITIONS};
pub use merge::{merge_config, MergeStrategy};
pub use registry::{ModuleFactory, ModuleRegistry};
pub use resolver::{resolve_modules, ModuleResolver, RejectedModule, Resolution};
pub use translator::Translator;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::loader::{FileLoader, FileSource, LoadOutcome, LoadedFileRegistry};

/// Errors raised by module hooks
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Module {module} failed to start: {reason}")]
    Start { module: String, reason: String },

    #[error("Failed to load translations from {path:?}: {reason}")]
    Translation { path: PathBuf, reason: String },

    #[error("Module {module}: {hook} timed out after {timeout:?}")]
    Timeout {
        module: String,
        hook: &'static str,
        timeout: Duration,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for module hooks
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Common interface of every dashboard module
///
/// The orchestrator only sequences these hooks; what a module does inside
/// them is its own business. Hooks should not fail for recoverable reasons;
/// errors are logged and the module continues in a degraded state.
#[async_trait]
pub trait DashboardModule: Send + Sync {
    /// Registered name of the module
    fn name(&self) -> &str;

    /// Declared configuration defaults
    fn defaults(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Attach the resolved descriptor
    fn set_descriptor(&mut self, descriptor: &ModuleDescriptor);

    /// Receive the merged configuration
    fn set_config(&mut self, config: Map<String, Value>);

    async fn load_scripts(&mut self, _ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        Ok(())
    }

    async fn load_styles(&mut self, _ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        Ok(())
    }

    async fn load_translations(&mut self, _ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        Ok(())
    }

    /// Begin the module's runtime behaviour
    async fn start(&mut self) -> ModuleResult<()>;

    /// Hide the module's display region
    fn hide(&mut self);

    fn is_hidden(&self) -> bool;
}

/// What a module hook can reach while bootstrapping
pub struct ModuleContext<'a> {
    loader: &'a FileLoader,
    files: &'a mut LoadedFileRegistry,
    vendor: &'a HashMap<String, String>,
    descriptor: &'a ModuleDescriptor,
    language: &'a str,
    root_dir: &'a Path,
}

impl<'a> ModuleContext<'a> {
    pub fn new(
        loader: &'a FileLoader,
        files: &'a mut LoadedFileRegistry,
        vendor: &'a HashMap<String, String>,
        descriptor: &'a ModuleDescriptor,
        language: &'a str,
        root_dir: &'a Path,
    ) -> Self {
        Self {
            loader,
            files,
            vendor,
            descriptor,
            language,
            root_dir,
        }
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        self.descriptor
    }

    /// Interface language
    pub fn language(&self) -> &str {
        self.language
    }

    /// Filesystem location of a module-relative file
    pub fn resolve_path(&self, file: &str) -> PathBuf {
        self.root_dir
            .join(self.descriptor.file_path(file).trim_start_matches('/'))
    }

    /// Load a script or stylesheet requested by the module
    ///
    /// Files are loaded at most once per run regardless of case. Returns
    /// `None` when the file was already loaded.
    pub async fn load_file(&mut self, file_name: &str) -> Option<LoadOutcome> {
        if self.files.has_file(file_name) {
            tracing::debug!("File already loaded: {}", file_name);
            return None;
        }

        let source = FileSource::locate(file_name, self.vendor, &self.descriptor.path);
        self.files.record_file(file_name);
        Some(self.loader.load_file(source.path()).await)
    }
}

/// Stage a module instance has reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    Resolved,
    CodeLoaded,
    Instantiated,
    ConfigMerged,
    ResourcesLoaded,
    Started,
    Hidden,
}

/// A live module: its descriptor, implementation and lifecycle state
pub struct ModuleInstance {
    descriptor: ModuleDescriptor,
    module: Box<dyn DashboardModule>,
    state: ModuleState,
    history: Vec<ModuleState>,
}

impl ModuleInstance {
    pub fn new(descriptor: ModuleDescriptor, module: Box<dyn DashboardModule>) -> Self {
        Self {
            descriptor,
            module,
            state: ModuleState::Instantiated,
            history: vec![ModuleState::Instantiated],
        }
    }

    /// Record the stages a descriptor passed through before it had an instance
    pub(crate) fn with_earlier_stages(mut self, stages: &[ModuleState]) -> Self {
        self.history.splice(0..0, stages.iter().copied());
        self
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    pub fn identifier(&self) -> &str {
        &self.descriptor.identifier
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn state(&self) -> ModuleState {
        self.state
    }

    /// Stages reached so far, oldest first
    pub fn history(&self) -> &[ModuleState] {
        &self.history
    }

    pub(crate) fn set_state(&mut self, state: ModuleState) {
        tracing::trace!("{}: {:?} -> {:?}", self.descriptor.identifier, self.state, state);
        self.state = state;
        self.history.push(state);
    }

    /// Descriptor and implementation, borrowed together for the bootstrap hooks
    pub(crate) fn parts_mut(&mut self) -> (&ModuleDescriptor, &mut dyn DashboardModule) {
        (&self.descriptor, self.module.as_mut())
    }

    pub fn module(&self) -> &dyn DashboardModule {
        self.module.as_ref()
    }

    /// Start the module, bounded by `timeout`
    pub async fn start(&mut self, timeout: Duration) -> ModuleResult<()> {
        let result = match tokio::time::timeout(timeout, self.module.start()).await {
            Ok(result) => result,
            Err(_) => Err(ModuleError::Timeout {
                module: self.descriptor.name.clone(),
                hook: "start",
                timeout,
            }),
        };

        if result.is_ok() {
            self.set_state(ModuleState::Started);
        }
        result
    }

    /// Hide the module
    pub fn hide(&mut self) {
        self.module.hide();
        self.set_state(ModuleState::Hidden);
    }

    pub fn is_hidden(&self) -> bool {
        self.module.is_hidden()
    }

    /// Serializable snapshot
    pub fn status(&self) -> ModuleStatus {
        ModuleStatus {
            identifier: self.descriptor.identifier.clone(),
            name: self.descriptor.name.clone(),
            position: self.descriptor.position.clone(),
            header: self.descriptor.header.clone(),
            state: self.state,
            hidden: self.module.is_hidden(),
        }
    }
}

impl std::fmt::Debug for ModuleInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleInstance")
            .field("identifier", &self.descriptor.identifier)
            .field("state", &self.state)
            .finish()
    }
}

/// Snapshot of a live module
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStatus {
    pub identifier: String,
    pub name: String,
    pub position: Option<String>,
    pub header: Option<String>,
    pub state: ModuleState,
    pub hidden: bool,
}
