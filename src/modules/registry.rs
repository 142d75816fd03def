//! Module registry
//!
//! Maps module names to factories producing fresh [`DashboardModule`]
//! instances. Looking up an unknown name yields `None`.

use std::collections::HashMap;
use std::sync::Arc;

use super::DashboardModule;

/// Creates a new instance of a module
pub type ModuleFactory = Arc<dyn Fn() -> Box<dyn DashboardModule> + Send + Sync>;

/// Registry of module factories keyed by name
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn DashboardModule> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Arc::new(factory)).is_some() {
            tracing::debug!("Replaced module factory for {}", name);
        }
    }

    /// Create a new instance of `name`
    pub fn create(&self, name: &str) -> Option<Box<dyn DashboardModule>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EventLog, RecordingModule};

    #[test]
    fn test_create_known_and_unknown() {
        let log = EventLog::new();
        let mut registry = ModuleRegistry::new();
        registry.register("clock", move || {
            Box::new(RecordingModule::new("clock", log.clone())) as Box<dyn DashboardModule>
        });

        assert!(registry.contains("clock"));
        assert_eq!(registry.create("clock").map(|m| m.name().to_string()), Some("clock".to_string()));
        assert!(registry.create("clokc").is_none());
    }

    #[test]
    fn test_each_create_is_a_fresh_instance() {
        let log = EventLog::new();
        let mut registry = ModuleRegistry::new();
        registry.register("weather", move || {
            Box::new(RecordingModule::new("weather", log.clone())) as Box<dyn DashboardModule>
        });

        let mut first = registry.create("weather").unwrap();
        let second = registry.create("weather").unwrap();
        first.hide();

        assert!(first.is_hidden());
        assert!(!second.is_hidden());
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = ModuleRegistry::new();
        for name in ["weather", "alert", "clock"] {
            let log = EventLog::new();
            registry.register(name, move || {
                Box::new(RecordingModule::new(name, log.clone())) as Box<dyn DashboardModule>
            });
        }
        assert_eq!(registry.names(), vec!["alert", "clock", "weather"]);
        assert_eq!(registry.len(), 3);
    }
}
