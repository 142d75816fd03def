//! Built-in modules
//!
//! The modules shipped with the host are declarative: a [`ModuleSpec`]
//! lists defaults, scripts, stylesheets and translation tables, and
//! [`StandardModule`] drives the lifecycle hooks from it. Widget rendering
//! happens in the page scripts, not here.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::translator::{Translator, FALLBACK_LANGUAGE};
use super::{DashboardModule, ModuleContext, ModuleDescriptor, ModuleRegistry, ModuleResult};

/// Declarative description of a module
#[derive(Debug, Clone, Default)]
pub struct ModuleSpec {
    pub name: String,
    pub defaults: Map<String, Value>,
    pub scripts: Vec<String>,
    pub styles: Vec<String>,
    /// Language code → module-relative JSON file
    pub translations: Vec<(String, String)>,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
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

    pub fn styles(mut self, styles: &[&str]) -> Self {
        self.styles = styles.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn translations(mut self, translations: &[(&str, &str)]) -> Self {
        self.translations = translations
            .iter()
            .map(|(lang, file)| (lang.to_string(), file.to_string()))
            .collect();
        self
    }

    fn translation_file(&self, language: &str) -> Option<&str> {
        self.translations
            .iter()
            .find(|(lang, _)| lang == language)
            .map(|(_, file)| file.as_str())
    }
}

/// Module driven entirely by a [`ModuleSpec`]
#[derive(Debug)]
pub struct StandardModule {
    spec: Arc<ModuleSpec>,
    descriptor: Option<ModuleDescriptor>,
    config: Map<String, Value>,
    translator: Translator,
    started: bool,
    hidden: bool,
}

impl StandardModule {
    pub fn new(spec: Arc<ModuleSpec>) -> Self {
        Self {
            spec,
            descriptor: None,
            config: Map::new(),
            translator: Translator::new(),
            started: false,
            hidden: false,
        }
    }

    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    pub fn descriptor(&self) -> Option<&ModuleDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

#[async_trait]
impl DashboardModule for StandardModule {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn defaults(&self) -> Map<String, Value> {
        self.spec.defaults.clone()
    }

    fn set_descriptor(&mut self, descriptor: &ModuleDescriptor) {
        self.descriptor = Some(descriptor.clone());
    }

    fn set_config(&mut self, config: Map<String, Value>) {
        self.config = config;
    }

    async fn load_scripts(&mut self, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        for script in &self.spec.scripts {
            ctx.load_file(script).await;
        }
        Ok(())
    }

    async fn load_styles(&mut self, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        for style in &self.spec.styles {
            ctx.load_file(style).await;
        }
        Ok(())
    }

    async fn load_translations(&mut self, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        let language = ctx.language().to_string();
        let mut first_error = None;

        // The fallback table is independent of the primary one
        if language != FALLBACK_LANGUAGE {
            if let Some(file) = self.spec.translation_file(FALLBACK_LANGUAGE) {
                match Translator::load_table(&ctx.resolve_path(file)).await {
                    Ok(table) => self.translator.set_fallback(table),
                    Err(e) => first_error = Some(e),
                }
            }
        }

        if let Some(file) = self.spec.translation_file(&language) {
            match Translator::load_table(&ctx.resolve_path(file)).await {
                Ok(table) => self.translator.set_primary(table),
                Err(e) => {
                    if let Some(fallback_error) = first_error.take() {
                        tracing::warn!("{}", fallback_error);
                    }
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn start(&mut self) -> ModuleResult<()> {
        tracing::info!("Starting module: {}", self.spec.name);
        self.started = true;
        Ok(())
    }

    fn hide(&mut self) {
        self.hidden = true;
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// Specs of the modules shipped with the host
pub fn builtin_specs() -> Vec<ModuleSpec> {
    vec![
        ModuleSpec::new("notification")
            .defaults(json!({"effect": "slide", "displayTime": 3500}))
            .styles(&["notification.css"]),
        ModuleSpec::new("alert")
            .defaults(json!({
                "effect": "slide",
                "alertEffect": "jelly",
                "displayTime": 3500,
                "position": "center",
                "welcomeMessage": false,
            }))
            .scripts(&["notificationFx.js"])
            .styles(&["notificationFx.css", "font-awesome.css"])
            .translations(&[("en", "translations/en.json"), ("de", "translations/de.json")]),
        ModuleSpec::new("clock")
            .defaults(json!({
                "displayType": "digital",
                "timeFormat": 24,
                "timezone": null,
                "displaySeconds": true,
                "showPeriod": true,
                "showDate": true,
                "showWeek": false,
                "dateFormat": "dddd, LL",
                "showSunTimes": false,
                "showMoonTimes": false,
            }))
            .scripts(&["moment.js", "moment-timezone.js", "suncalc.js"])
            .styles(&["clock_styles.css", "font-awesome.css"]),
        ModuleSpec::new("calendar")
            .defaults(json!({
                "maximumEntries": 10,
                "maximumNumberOfDays": 365,
                "fetchInterval": 3_600_000,
                "displaySymbol": true,
                "defaultSymbol": "calendar-days",
                "colored": false,
                "calendars": [],
            }))
            .scripts(&["calendarutils.js", "moment.js", "moment-timezone.js"])
            .styles(&["calendar.css", "font-awesome.css"])
            .translations(&[("en", "translations/en.json"), ("de", "translations/de.json")]),
        ModuleSpec::new("compliments")
            .defaults(json!({
                "updateInterval": 30_000,
                "fadeSpeed": 4000,
                "random": true,
                "compliments": {
                    "morning": ["Good morning!"],
                    "afternoon": ["Looking good today!"],
                    "evening": ["Have a nice evening!"],
                },
            }))
            .scripts(&["moment.js"])
            .styles(&["compliments.css"]),
        ModuleSpec::new("newsfeed")
            .defaults(json!({
                "feeds": [{
                    "title": "New York Times",
                    "url": "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml",
                }],
                "showSourceTitle": true,
                "showPublishDate": true,
                "reloadInterval": 300_000,
                "updateInterval": 10_000,
            }))
            .scripts(&["moment.js"])
            .styles(&["newsfeed.css"])
            .translations(&[("en", "translations/en.json"), ("de", "translations/de.json")]),
        ModuleSpec::new("weather")
            .defaults(json!({
                "weatherProvider": "openmeteo",
                "type": "current",
                "units": "metric",
                "updateInterval": 600_000,
                "lat": 0,
                "lon": 0,
            }))
            .scripts(&[
                "moment.js",
                "suncalc.js",
                "weatherutils.js",
                "weatherobject.js",
                "weatherprovider.js",
            ])
            .styles(&["font-awesome.css", "weather-icons.css", "weather.css"])
            .translations(&[("en", "translations/en.json"), ("de", "translations/de.json")]),
        ModuleSpec::new("updatenotification")
            .defaults(json!({
                "updateInterval": 600_000,
                "refreshInterval": 86_400_000,
                "ignoreModules": [],
            }))
            .styles(&["updatenotification.css"]),
        ModuleSpec::new("helloworld").defaults(json!({"text": "Hello World!"})),
    ]
}

/// Registry containing every built-in module
pub fn builtin_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    for spec in builtin_specs() {
        register_spec(&mut registry, spec);
    }
    registry
}

/// Register a spec-driven module
pub fn register_spec(registry: &mut ModuleRegistry, spec: ModuleSpec) {
    let name = spec.name.clone();
    let spec = Arc::new(spec);
    registry.register(name, move || {
        Box::new(StandardModule::new(Arc::clone(&spec))) as Box<dyn DashboardModule>
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::loader::{default_vendor_map, FileLoader, LoadedFileRegistry};
    use crate::modules::resolver::DEFAULT_MODULES;
    use crate::modules::ModuleError;
    use crate::testing::{descriptor, RecordingDocument};
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_registry_covers_default_modules() {
        let registry = builtin_registry();
        for name in DEFAULT_MODULES {
            assert!(registry.contains(name), "missing builtin {}", name);
        }
    }

    #[tokio::test]
    async fn test_standard_module_loads_declared_files() {
        let document = Arc::new(RecordingDocument::new());
        let loader = FileLoader::new(
            document.clone(),
            Duration::from_secs(1),
            CancellationToken::new(),
        );
        let mut files = LoadedFileRegistry::new();
        let vendor = default_vendor_map();
        let descriptor = descriptor(1, "clock");
        let root = std::path::PathBuf::from(".");

        let mut module = builtin_registry().create("clock").unwrap();
        let mut ctx = ModuleContext::new(&loader, &mut files, &vendor, &descriptor, "en", &root);
        module.load_scripts(&mut ctx).await.unwrap();
        module.load_styles(&mut ctx).await.unwrap();

        let present = document.present().await;
        assert_eq!(present.len(), 5);
        assert_eq!(present[3], "modules/default/clock/clock_styles.css");
        assert_eq!(present[4], "vendor/css/font-awesome.css");
    }

    #[tokio::test]
    async fn test_translations_with_fallback() {
        let dir = tempdir().unwrap();
        let translations = dir.path().join("modules/default/calendar/translations");
        std::fs::create_dir_all(&translations).unwrap();
        std::fs::write(translations.join("en.json"), r#"{"TODAY": "Today", "TOMORROW": "Tomorrow"}"#)
            .unwrap();
        std::fs::write(translations.join("de.json"), r#"{"TODAY": "Heute"}"#).unwrap();

        let loader = FileLoader::new(
            Arc::new(RecordingDocument::new()),
            Duration::from_secs(1),
            CancellationToken::new(),
        );
        let mut files = LoadedFileRegistry::new();
        let vendor = default_vendor_map();
        let descriptor = descriptor(2, "calendar");
        let root = dir.path().to_path_buf();

        let spec = builtin_specs()
            .into_iter()
            .find(|s| s.name == "calendar")
            .unwrap();
        let mut module = StandardModule::new(Arc::new(spec));
        let mut ctx = ModuleContext::new(&loader, &mut files, &vendor, &descriptor, "de", &root);
        module.load_translations(&mut ctx).await.unwrap();

        assert_eq!(module.translator().translate("TODAY"), "Heute");
        assert_eq!(module.translator().translate("TOMORROW"), "Tomorrow");
    }

    #[tokio::test]
    async fn test_broken_primary_translation_keeps_fallback() {
        let dir = tempdir().unwrap();
        let translations = dir.path().join("modules/default/calendar/translations");
        std::fs::create_dir_all(&translations).unwrap();
        std::fs::write(translations.join("en.json"), r#"{"TODAY": "Today"}"#).unwrap();
        std::fs::write(translations.join("de.json"), "{ not json").unwrap();

        let loader = FileLoader::new(
            Arc::new(RecordingDocument::new()),
            Duration::from_secs(1),
            CancellationToken::new(),
        );
        let mut files = LoadedFileRegistry::new();
        let vendor = default_vendor_map();
        let descriptor = descriptor(2, "calendar");
        let root = dir.path().to_path_buf();

        let spec = builtin_specs()
            .into_iter()
            .find(|s| s.name == "calendar")
            .unwrap();
        let mut module = StandardModule::new(Arc::new(spec));
        let mut ctx = ModuleContext::new(&loader, &mut files, &vendor, &descriptor, "de", &root);

        let err = module.load_translations(&mut ctx).await.unwrap_err();
        assert!(matches!(err, ModuleError::Translation { .. }));
        assert_eq!(module.translator().translate("TODAY"), "Today");
    }

    #[tokio::test]
    async fn test_missing_translation_file_is_an_error() {
        let dir = tempdir().unwrap();
        let loader = FileLoader::new(
            Arc::new(RecordingDocument::new()),
            Duration::from_secs(1),
            CancellationToken::new(),
        );
        let mut files = LoadedFileRegistry::new();
        let vendor = default_vendor_map();
        let descriptor = descriptor(1, "weather");
        let root = dir.path().to_path_buf();

        let mut module = builtin_registry().create("weather").unwrap();
        let mut ctx = ModuleContext::new(&loader, &mut files, &vendor, &descriptor, "en", &root);

        assert!(module.load_translations(&mut ctx).await.is_err());
    }

    #[tokio::test]
    async fn test_start_and_hide() {
        let mut module = builtin_registry().create("helloworld").unwrap();
        module.start().await.unwrap();
        assert!(!module.is_hidden());
        module.hide();
        assert!(module.is_hidden());
    }
}
