//! Host shell
//!
//! The shell is everything the orchestrator asks the surrounding
//! application for: runtime environment variables, the valid screen
//! positions, module instances by name, and a place to announce that all
//! modules have started.

mod env_client;

pub use env_client::{EnvClient, EnvClientConfig};
pub(crate) use env_client::normalize_base_path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::modules::{default_positions, DashboardModule, ModuleInstance, ModuleRegistry};

/// Services the orchestrator consumes from the host application
#[async_trait]
pub trait HostShell: Send + Sync {
    /// Runtime environment, read once per run
    async fn fetch_env_vars(&self) -> Result<EnvVars, HostError>;

    /// Screen regions modules may be placed into
    fn available_positions(&self) -> Vec<String>;

    /// New instance of a module, `None` if the name is unknown
    fn create_module(&self, name: &str) -> Option<Box<dyn DashboardModule>>;

    /// Announce that every module start has settled
    fn modules_started(&self, modules: &[ModuleInstance]);
}

/// Runtime environment served by the host's `env` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVars {
    /// Root directory of user-installed modules
    #[serde(default = "default_modules_dir")]
    pub modules_dir: String,

    /// Override stylesheet, loaded after every module stylesheet
    #[serde(default = "default_custom_css")]
    pub custom_css: String,

    /// Any further values the host publishes
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn default_modules_dir() -> String {
    "modules".to_string()
}

fn default_custom_css() -> String {
    "css/custom.css".to_string()
}

impl Default for EnvVars {
    fn default() -> Self {
        Self {
            modules_dir: default_modules_dir(),
            custom_css: default_custom_css(),
            extra: HashMap::new(),
        }
    }
}

/// Errors talking to the host
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Host unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Unexpected status {0} from host")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Where environment variables come from
pub enum EnvSource {
    /// Fixed values, e.g. from the configuration file
    Static(EnvVars),
    /// Fetched from a running host's `env` endpoint
    Remote(EnvClient),
}

impl EnvSource {
    pub async fn fetch(&self) -> Result<EnvVars, HostError> {
        match self {
            EnvSource::Static(env) => Ok(env.clone()),
            EnvSource::Remote(client) => client.fetch().await,
        }
    }
}

/// Events published by [`LocalShell`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellEvent {
    ModulesStarted {
        identifiers: Vec<String>,
        at: DateTime<Utc>,
    },
}

/// Host shell backed by a module registry
pub struct LocalShell {
    env: EnvSource,
    positions: Vec<String>,
    registry: ModuleRegistry,
    events: broadcast::Sender<ShellEvent>,
}

impl LocalShell {
    pub fn new(env: EnvSource, registry: ModuleRegistry) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            env,
            positions: default_positions(),
            registry,
            events,
        }
    }

    /// Replace the set of valid screen positions
    pub fn with_positions(mut self, positions: Vec<String>) -> Self {
        self.positions = positions;
        self
    }

    /// Subscribe to shell events
    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.events.subscribe()
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }
}

#[async_trait]
impl HostShell for LocalShell {
    async fn fetch_env_vars(&self) -> Result<EnvVars, HostError> {
        self.env.fetch().await
    }

    fn available_positions(&self) -> Vec<String> {
        self.positions.clone()
    }

    fn create_module(&self, name: &str) -> Option<Box<dyn DashboardModule>> {
        self.registry.create(name)
    }

    fn modules_started(&self, modules: &[ModuleInstance]) {
        let event = ShellEvent::ModulesStarted {
            identifiers: modules.iter().map(|m| m.identifier().to_string()).collect(),
            at: Utc::now(),
        };
        if self.events.send(event).is_err() {
            tracing::debug!("No subscribers for modules-started event");
        }
    }
}
