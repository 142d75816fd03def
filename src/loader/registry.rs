//! Loaded file registry
//!
//! Tracks every resource already injected during a run. Injection cannot be
//! undone, so the registry is append-only and is consulted before every load.

use std::collections::{HashMap, HashSet};

/// Well-known third-party files and their location below `vendor/`
pub fn default_vendor_map() -> HashMap<String, String> {
    [
        ("moment.js", "node_modules/moment/min/moment-with-locales.js"),
        (
            "moment-timezone.js",
            "node_modules/moment-timezone/builds/moment-timezone-with-data.js",
        ),
        ("weather-icons.css", "node_modules/weathericons/css/weather-icons.css"),
        (
            "weather-icons-wind.css",
            "node_modules/weathericons/css/weather-icons-wind.css",
        ),
        ("font-awesome.css", "css/font-awesome.css"),
        ("nunjucks.js", "node_modules/nunjucks/browser/nunjucks.min.js"),
        ("suncalc.js", "node_modules/suncalc/suncalc.js"),
        ("croner.js", "node_modules/croner/dist/croner.umd.js"),
        ("animate.css", "node_modules/animate.css/animate.min.css"),
    ]
    .into_iter()
    .map(|(alias, path)| (alias.to_string(), path.to_string()))
    .collect()
}

/// Resources injected so far in one run
#[derive(Debug, Default)]
pub struct LoadedFileRegistry {
    /// Module code URLs, compared exactly
    module_files: HashSet<String>,
    /// Files requested by modules, compared case-insensitively
    files: HashSet<String>,
}

impl LoadedFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a module's main code resource was already loaded
    pub fn has_module_file(&self, url: &str) -> bool {
        self.module_files.contains(url)
    }

    /// Record a module's main code resource
    pub fn record_module_file(&mut self, url: &str) {
        self.module_files.insert(url.to_string());
    }

    /// Whether a module-requested file was already loaded
    pub fn has_file(&self, name: &str) -> bool {
        self.files.contains(&name.to_lowercase())
    }

    /// Record a module-requested file. Returns `false` if it was already present.
    pub fn record_file(&mut self, name: &str) -> bool {
        self.files.insert(name.to_lowercase())
    }

    /// Number of distinct module code resources loaded
    pub fn module_file_count(&self) -> usize {
        self.module_files.len()
    }

    /// Number of distinct module-requested files loaded
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Where a module-requested file is loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Absolute URL or a path containing a directory part, loaded as given
    Direct(String),
    /// Vendor alias, loaded from `vendor/`
    Vendor(String),
    /// Plain file name, loaded from the module directory
    ModuleRelative(String),
}

impl FileSource {
    /// Decide where `file_name` comes from
    pub fn locate(
        file_name: &str,
        vendor: &HashMap<String, String>,
        module_path: &str,
    ) -> FileSource {
        if file_name.starts_with("http://")
            || file_name.starts_with("https://")
            || file_name.contains('/')
        {
            return FileSource::Direct(file_name.to_string());
        }

        if let Some(path) = vendor.get(file_name) {
            return FileSource::Vendor(format!("vendor/{}", path));
        }

        FileSource::ModuleRelative(format!("{}{}", module_path, file_name))
    }

    /// Path handed to the file loader
    pub fn path(&self) -> &str {
        match self {
            FileSource::Direct(p) | FileSource::Vendor(p) | FileSource::ModuleRelative(p) => p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_files_are_case_sensitive() {
        let mut registry = LoadedFileRegistry::new();
        registry.record_module_file("modules/default/clock/clock.js");

        assert!(registry.has_module_file("modules/default/clock/clock.js"));
        assert!(!registry.has_module_file("modules/default/clock/Clock.js"));
        assert_eq!(registry.module_file_count(), 1);
    }

    #[test]
    fn test_files_are_case_insensitive() {
        let mut registry = LoadedFileRegistry::new();

        assert!(registry.record_file("Moment.js"));
        assert!(registry.has_file("moment.js"));
        assert!(!registry.record_file("MOMENT.JS"));
        assert_eq!(registry.file_count(), 1);
    }

    #[test]
    fn test_locate_direct() {
        let vendor = default_vendor_map();
        assert_eq!(
            FileSource::locate("https://cdn.test/x.js", &vendor, "modules/a/"),
            FileSource::Direct("https://cdn.test/x.js".to_string())
        );
        assert_eq!(
            FileSource::locate("css/custom.css", &vendor, "modules/a/"),
            FileSource::Direct("css/custom.css".to_string())
        );
    }

    #[test]
    fn test_locate_vendor() {
        let vendor = default_vendor_map();
        let source = FileSource::locate("moment.js", &vendor, "modules/default/clock/");
        assert_eq!(
            source.path(),
            "vendor/node_modules/moment/min/moment-with-locales.js"
        );
    }

    #[test]
    fn test_locate_module_relative() {
        let vendor = default_vendor_map();
        assert_eq!(
            FileSource::locate("clock_styles.css", &vendor, "modules/default/clock/"),
            FileSource::ModuleRelative("modules/default/clock/clock_styles.css".to_string())
        );
    }
}
