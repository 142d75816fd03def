//! Test doubles shared by unit tests

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

use crate::host::{EnvVars, HostError, HostShell};
use crate::loader::{Document, LoaderError, LoaderResult, ResourceKind};
use crate::modules::{
    DashboardModule, MergeStrategy, ModuleContext, ModuleDescriptor, ModuleError, ModuleInstance,
    ModuleRegistry, ModuleResult,
};

/// Ordered, shareable list of events
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

/// Descriptor for a built-in module at `index`
pub fn descriptor(index: usize, name: &str) -> ModuleDescriptor {
    ModuleDescriptor {
        index,
        identifier: format!("module_{}_{}", index, name),
        name: name.to_string(),
        module_class: name.to_string(),
        path: format!("modules/default/{}/", name),
        file: format!("{}.js", name),
        position: Some("top_left".to_string()),
        animate_in: None,
        animate_out: None,
        hidden_on_startup: false,
        header: None,
        merge_strategy: MergeStrategy::Shallow,
        config: Map::new(),
        classes: name.to_string(),
    }
}

/// Document that records injections and can be told to fail or hang
#[derive(Default)]
pub struct RecordingDocument {
    present: tokio::sync::Mutex<Vec<String>>,
    attempts: tokio::sync::Mutex<Vec<String>>,
    removed: tokio::sync::Mutex<Vec<String>>,
    failing: Vec<String>,
    hanging: Vec<String>,
    log: Option<EventLog>,
}

impl RecordingDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing.push(path.to_string());
        self
    }

    pub fn hanging(mut self, path: &str) -> Self {
        self.hanging.push(path.to_string());
        self
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = Some(log);
        self
    }

    pub async fn present(&self) -> Vec<String> {
        self.present.lock().await.clone()
    }

    pub async fn attempts(&self) -> Vec<String> {
        self.attempts.lock().await.clone()
    }

    pub async fn removed(&self) -> Vec<String> {
        self.removed.lock().await.clone()
    }
}

#[async_trait]
impl Document for RecordingDocument {
    async fn inject(&self, _kind: ResourceKind, path: &str) -> LoaderResult<()> {
        self.attempts.lock().await.push(path.to_string());
        if let Some(log) = &self.log {
            log.push(format!("load:{}", path));
        }

        if self.hanging.iter().any(|p| p == path) {
            std::future::pending::<()>().await;
        }
        if self.failing.iter().any(|p| p == path) {
            return Err(LoaderError::LoadFailed {
                path: path.to_string(),
                reason: "404".to_string(),
            });
        }

        self.present.lock().await.push(path.to_string());
        Ok(())
    }

    async fn remove(&self, _kind: ResourceKind, path: &str) {
        self.removed.lock().await.push(path.to_string());
        self.present.lock().await.retain(|p| p != path);
    }
}

/// Module recording every hook call into an [`EventLog`]
pub struct RecordingModule {
    name: String,
    log: EventLog,
    defaults: Map<String, Value>,
    scripts: Vec<String>,
    fail_start: bool,
    hang_start: bool,
    hang_scripts: bool,
    hidden: bool,
}

impl RecordingModule {
    pub fn new(name: &str, log: EventLog) -> Self {
        Self {
            name: name.to_string(),
            log,
            defaults: Map::new(),
            scripts: Vec::new(),
            fail_start: false,
            hang_start: false,
            hang_scripts: false,
            hidden: false,
        }
    }

    pub fn defaults(mut self, defaults: Value) -> Self {
        if let Value::Object(map) = defaults {
            self.defaults = map;
        }
        self
    }

    pub fn scripts(mut self, scripts: &[&str]) -> Self {
        self.scripts = scripts.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn hanging_start(mut self) -> Self {
        self.hang_start = true;
        self
    }

    pub fn hanging_scripts(mut self) -> Self {
        self.hang_scripts = true;
        self
    }
}

#[async_trait]
impl DashboardModule for RecordingModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn defaults(&self) -> Map<String, Value> {
        self.defaults.clone()
    }

    fn set_descriptor(&mut self, descriptor: &ModuleDescriptor) {
        self.log.push(format!("descriptor:{}", descriptor.identifier));
    }

    fn set_config(&mut self, config: Map<String, Value>) {
        self.log
            .push(format!("config:{}:{}", self.name, Value::Object(config)));
    }

    async fn load_scripts(&mut self, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        if self.hang_scripts {
            std::future::pending::<()>().await;
        }
        for script in &self.scripts {
            ctx.load_file(script).await;
        }
        self.log.push(format!("scripts:{}", self.name));
        Ok(())
    }

    async fn load_styles(&mut self, _ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        self.log.push(format!("styles:{}", self.name));
        Ok(())
    }

    async fn load_translations(&mut self, _ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        self.log.push(format!("translations:{}", self.name));
        Ok(())
    }

    async fn start(&mut self) -> ModuleResult<()> {
        if self.hang_start {
            std::future::pending::<()>().await;
        }
        self.log.push(format!("start:{}", self.name));
        if self.fail_start {
            return Err(ModuleError::Start {
                module: self.name.clone(),
                reason: "helper unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn hide(&mut self) {
        self.hidden = true;
        self.log.push(format!("hide:{}", self.name));
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// Host shell backed by a registry, recording notifications
pub struct TestShell {
    pub env: Option<EnvVars>,
    pub positions: Vec<String>,
    pub registry: ModuleRegistry,
    pub log: EventLog,
    pub notifications: Mutex<Vec<Vec<String>>>,
}

impl TestShell {
    pub fn new(registry: ModuleRegistry, log: EventLog) -> Self {
        Self {
            env: Some(EnvVars::default()),
            positions: crate::modules::default_positions(),
            registry,
            log,
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn notifications(&self) -> Vec<Vec<String>> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostShell for TestShell {
    async fn fetch_env_vars(&self) -> Result<EnvVars, HostError> {
        self.env
            .clone()
            .ok_or_else(|| HostError::Unavailable("env endpoint down".to_string()))
    }

    fn available_positions(&self) -> Vec<String> {
        self.positions.clone()
    }

    fn create_module(&self, name: &str) -> Option<Box<dyn DashboardModule>> {
        self.registry.create(name)
    }

    fn modules_started(&self, modules: &[ModuleInstance]) {
        self.log.push("modules_started");
        self.notifications
            .lock()
            .unwrap()
            .push(modules.iter().map(|m| m.identifier().to_string()).collect());
    }
}

/// Registry where every name in `names` is a [`RecordingModule`]
pub fn recording_registry(names: &[&str], log: &EventLog) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    for name in names {
        let name = name.to_string();
        let log = log.clone();
        registry.register(name.clone(), move || {
            Box::new(RecordingModule::new(&name, log.clone())) as Box<dyn DashboardModule>
        });
    }
    registry
}
