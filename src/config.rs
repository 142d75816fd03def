//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::host::EnvVars;
use crate::modules::{default_positions, ModuleEntry};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Configured modules, in display order
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Path prefix the host is mounted under
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_path() -> String {
    "/".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_path: default_base_path(),
        }
    }
}

/// Module loading configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
    /// Directory all resource paths are relative to
    #[serde(default = "default_root_dir")]
    pub root_dir: String,

    /// Root of user-installed modules
    #[serde(default = "default_modules_dir")]
    pub modules_dir: String,

    /// Root of the built-in modules
    #[serde(default = "default_default_modules_dir")]
    pub default_modules_dir: String,

    /// Stylesheet loaded after every module stylesheet
    #[serde(default = "default_custom_css")]
    pub custom_css: String,

    #[serde(default = "default_language")]
    pub language: String,

    /// Screen regions modules may be placed into
    #[serde(default = "default_positions")]
    pub positions: Vec<String>,

    /// Extra vendor aliases, merged over the built-in ones
    #[serde(default)]
    pub vendor: HashMap<String, String>,

    /// Host modules loaded before the configured ones
    #[serde(default)]
    pub system_modules: Vec<ModuleEntry>,

    #[serde(default = "default_load_timeout")]
    pub load_timeout_ms: u64,

    #[serde(default = "default_hook_timeout")]
    pub hook_timeout_ms: u64,

    #[serde(default = "default_start_timeout")]
    pub start_timeout_ms: u64,

    /// Let copies under `modules_dir` shadow built-in modules (test setups)
    #[serde(default)]
    pub shadow_default_modules: bool,
}

fn default_root_dir() -> String {
    ".".to_string()
}

fn default_modules_dir() -> String {
    "modules".to_string()
}

fn default_default_modules_dir() -> String {
    crate::modules::resolver::DEFAULT_MODULES_DIR.to_string()
}

fn default_custom_css() -> String {
    "css/custom.css".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_load_timeout() -> u64 {
    10_000
}

fn default_hook_timeout() -> u64 {
    30_000
}

fn default_start_timeout() -> u64 {
    30_000
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            modules_dir: default_modules_dir(),
            default_modules_dir: default_default_modules_dir(),
            custom_css: default_custom_css(),
            language: default_language(),
            positions: default_positions(),
            vendor: HashMap::new(),
            system_modules: Vec::new(),
            load_timeout_ms: default_load_timeout(),
            hook_timeout_ms: default_hook_timeout(),
            start_timeout_ms: default_start_timeout(),
            shadow_default_modules: false,
        }
    }
}

impl LoaderConfig {
    /// Environment published on the `env` endpoint
    pub fn env_vars(&self) -> EnvVars {
        let mut env = EnvVars {
            modules_dir: self.modules_dir.clone(),
            custom_css: self.custom_css.clone(),
            ..Default::default()
        };
        env.extra.insert(
            "defaultModulesDir".to_string(),
            Value::String(self.default_modules_dir.clone()),
        );
        env.extra
            .insert("language".to_string(), Value::String(self.language.clone()));
        env
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("mirrorhost").join("config.toml")),
            Some(PathBuf::from("/etc/mirrorhost/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `MIRROR_*` overrides looked up through `lookup`
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(host) = lookup("MIRROR_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("MIRROR_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("Ignoring invalid MIRROR_PORT: {}", port),
            }
        }
        if let Some(base_path) = lookup("MIRROR_BASE_PATH") {
            self.server.base_path = base_path;
        }

        // Loader overrides
        if let Some(root_dir) = lookup("MIRROR_ROOT_DIR") {
            self.loader.root_dir = root_dir;
        }
        if let Some(modules_dir) = lookup("MIRROR_MODULES_DIR") {
            self.loader.modules_dir = modules_dir;
        }
        if let Some(custom_css) = lookup("MIRROR_CUSTOM_CSS") {
            self.loader.custom_css = custom_css;
        }
        if let Some(language) = lookup("MIRROR_LANGUAGE") {
            self.loader.language = language;
        }

        // Logging overrides
        if let Some(level) = lookup("MIRROR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("MIRROR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# mirrorhost Configuration
#
# Environment variables override these settings:
# - MIRROR_HOST
# - MIRROR_PORT
# - MIRROR_BASE_PATH
# - MIRROR_ROOT_DIR
# - MIRROR_MODULES_DIR
# - MIRROR_CUSTOM_CSS
# - MIRROR_LANGUAGE
# - MIRROR_LOG_LEVEL
# - MIRROR_LOG_FORMAT

[server]
# Address to listen on
host = "localhost"
port = 8080

# Path prefix the dashboard is served under
base_path = "/"

[loader]
# Directory resource paths are relative to
root_dir = "."

# Where user-installed modules live
modules_dir = "modules"

# Where the built-in modules live
default_modules_dir = "modules/default"

# Loaded after every module stylesheet
custom_css = "css/custom.css"

# Interface language
language = "en"

# Timeouts (ms) for a single file load, a bootstrap hook and a module start
load_timeout_ms = 10000
hook_timeout_ms = 30000
start_timeout_ms = 30000

# Extra vendor aliases
# [loader.vendor]
# "chart.js" = "node_modules/chart.js/dist/chart.umd.js"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Modules, in display order
[[modules]]
module = "clock"
position = "top_left"

[[modules]]
module = "calendar"
header = "Holidays"
position = "top_left"

[[modules]]
module = "compliments"
position = "lower_third"

[[modules]]
module = "weather"
position = "top_right"

[modules.config]
weatherProvider = "openmeteo"
type = "current"
"#
    .to_string()
}
