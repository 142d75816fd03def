//! Module descriptors
//!
//! [`ModuleEntry`] is one module as written in the configuration file.
//! [`ModuleDescriptor`] is the resolved, validated record the bootstrapper
//! works from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::merge::MergeStrategy;

/// Screen regions a module can be placed into
pub const DEFAULT_POSITIONS: &[&str] = &[
    "top_bar",
    "top_left",
    "top_center",
    "top_right",
    "upper_third",
    "middle_center",
    "lower_third",
    "bottom_left",
    "bottom_center",
    "bottom_right",
    "bottom_bar",
    "fullscreen_above",
    "fullscreen_below",
];

/// Class of the pseudo-module that is always loaded first
pub const NOTIFICATION_MODULE: &str = "notification";

/// Owned copy of [`DEFAULT_POSITIONS`]
pub fn default_positions() -> Vec<String> {
    DEFAULT_POSITIONS.iter().map(|p| p.to_string()).collect()
}

/// A module as configured by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    /// Implementation family, possibly namespaced (`vendor/ModuleX`)
    #[serde(alias = "module")]
    pub module_class: String,

    /// Kept untyped so that a non-string position can be reported instead
    /// of failing the whole configuration file. An explicit `null` stays
    /// `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animate_in: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animate_out: Option<Value>,

    #[serde(default)]
    pub hidden_on_startup: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_deep_merge: Option<bool>,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub config: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
}

/// Keeps a present `null` apart from a missing field
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl ModuleEntry {
    /// Create an entry for a module class with no placement
    pub fn new(module_class: impl Into<String>) -> Self {
        Self {
            module_class: module_class.into(),
            ..Default::default()
        }
    }

    /// Place the module into a screen region
    pub fn position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(Value::String(position.into()));
        self
    }

    /// Set the instance configuration
    pub fn config(mut self, config: Value) -> Self {
        if let Value::Object(map) = config {
            self.config = map;
        }
        self
    }

    /// Set the display header
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn hidden_on_startup(mut self) -> Self {
        self.hidden_on_startup = true;
        self
    }

    pub fn deep_merge(mut self) -> Self {
        self.config_deep_merge = Some(true);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Short name: the last path segment of the module class
    pub fn short_name(&self) -> &str {
        self.module_class
            .rsplit('/')
            .next()
            .unwrap_or(&self.module_class)
    }
}

/// Resolved configuration record for one module instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    /// Ordinal position among all loaded module entries
    pub index: usize,
    /// Unique instance id, `module_{index}_{moduleClass}`
    pub identifier: String,
    /// Lookup name, last segment of `module_class`
    pub name: String,
    pub module_class: String,
    /// Directory containing the module's resources, always ends with `/`
    pub path: String,
    /// Main code file, `{name}.js`
    pub file: String,
    pub position: Option<String>,
    pub animate_in: Option<Value>,
    pub animate_out: Option<Value>,
    pub hidden_on_startup: bool,
    pub header: Option<String>,
    pub merge_strategy: MergeStrategy,
    pub config: Map<String, Value>,
    /// Space-separated tags applied to the module's wrapper
    pub classes: String,
}

impl ModuleDescriptor {
    /// URL of the module's main code resource
    pub fn url(&self) -> String {
        format!("{}{}", self.path, self.file)
    }

    /// Path of a file relative to the module directory
    pub fn file_path(&self, file: &str) -> String {
        format!("{}{}", self.path, file)
    }

    /// Whether the module is rendered into a screen region
    pub fn is_headless(&self) -> bool {
        self.position.is_none()
    }
}

/// Name of a JSON value's type, for diagnostics
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
