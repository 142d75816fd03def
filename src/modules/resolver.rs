//! Module Resolver
//!
//! Expands the configured module list into validated [`ModuleDescriptor`]s:
//! prepends the notification pseudo-module and the system modules, drops
//! disabled entries, rejects invalid positions and computes resource paths.

use serde::Serialize;

use super::descriptor::{value_type_name, ModuleDescriptor, ModuleEntry, NOTIFICATION_MODULE};
use super::merge::MergeStrategy;
use crate::host::EnvVars;

/// Modules shipped with the host, resolved from the built-in directory
pub const DEFAULT_MODULES: &[&str] = &[
    "notification",
    "alert",
    "calendar",
    "clock",
    "compliments",
    "helloworld",
    "newsfeed",
    "updatenotification",
    "weather",
];

/// Built-in module directory
pub const DEFAULT_MODULES_DIR: &str = "modules/default";

/// A configured module that did not survive resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedModule {
    pub index: usize,
    pub module_class: String,
    pub reason: String,
}

/// Result of resolving a module list
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    pub descriptors: Vec<ModuleDescriptor>,
    pub rejected: Vec<RejectedModule>,
}

/// Resolves module entries into descriptors
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    default_modules: Vec<String>,
    default_modules_dir: String,
    shadow_defaults: bool,
}

impl Default for ModuleResolver {
    fn default() -> Self {
        Self {
            default_modules: DEFAULT_MODULES.iter().map(|m| m.to_string()).collect(),
            default_modules_dir: DEFAULT_MODULES_DIR.to_string(),
            shadow_defaults: false,
        }
    }
}

impl ModuleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory built-in modules are resolved from
    pub fn default_modules_dir(mut self, dir: impl Into<String>) -> Self {
        self.default_modules_dir = dir.into().trim_end_matches('/').to_string();
        self
    }

    /// Let local copies under the user modules directory shadow built-in
    /// modules, used by automated tests. Ignored when the user modules
    /// directory is the plain `modules` directory.
    pub fn shadow_defaults(mut self, enabled: bool) -> Self {
        self.shadow_defaults = enabled;
        self
    }

    /// Whether `name` is one of the built-in modules
    pub fn is_default_module(&self, name: &str) -> bool {
        self.default_modules.iter().any(|m| m == name)
    }

    /// Resolve the full module list
    ///
    /// Order is notification, system modules, configured modules; the
    /// position in that list becomes each descriptor's `index`.
    pub fn resolve(
        &self,
        configured: &[ModuleEntry],
        system: &[ModuleEntry],
        env: &EnvVars,
        available_positions: &[String],
    ) -> Resolution {
        let notification = ModuleEntry::new(NOTIFICATION_MODULE);
        let all = std::iter::once(&notification)
            .chain(system.iter())
            .chain(configured.iter());

        let mut resolution = Resolution::default();

        for (index, entry) in all.enumerate() {
            if entry.disabled {
                tracing::debug!("Skipping disabled module {}", entry.module_class);
                continue;
            }

            let position = match self.validate_position(entry, available_positions) {
                Ok(position) => position,
                Err(reason) => {
                    tracing::warn!("Module {} {}", entry.module_class, reason);
                    resolution.rejected.push(RejectedModule {
                        index,
                        module_class: entry.module_class.clone(),
                        reason,
                    });
                    continue;
                }
            };

            resolution
                .descriptors
                .push(self.build_descriptor(index, entry, position, env));
        }

        resolution
    }

    fn validate_position(
        &self,
        entry: &ModuleEntry,
        available_positions: &[String],
    ) -> Result<Option<String>, String> {
        match &entry.position {
            None => Ok(None),
            Some(serde_json::Value::String(position)) => {
                if available_positions.iter().any(|p| p == position) {
                    Ok(Some(position.clone()))
                } else {
                    Err(format!("has invalid position: {}", position))
                }
            }
            Some(other) => Err(format!(
                "has an invalid position type: {}",
                value_type_name(other)
            )),
        }
    }

    fn module_folder(&self, entry: &ModuleEntry, env: &EnvVars) -> String {
        let user_folder = format!(
            "{}/{}",
            env.modules_dir.trim_end_matches('/'),
            entry.module_class
        );

        if !self.is_default_module(entry.short_name()) {
            return user_folder;
        }

        let default_folder = format!("{}/{}", self.default_modules_dir, entry.module_class);
        if self.shadow_defaults && env.modules_dir.trim_end_matches('/') != "modules" {
            user_folder
        } else {
            default_folder
        }
    }

    fn build_descriptor(
        &self,
        index: usize,
        entry: &ModuleEntry,
        position: Option<String>,
        env: &EnvVars,
    ) -> ModuleDescriptor {
        let name = entry.short_name().to_string();
        let classes = match &entry.classes {
            Some(classes) => format!("{} {}", classes, entry.module_class),
            None => entry.module_class.clone(),
        };

        ModuleDescriptor {
            index,
            identifier: format!("module_{}_{}", index, entry.module_class),
            file: format!("{}.js", name),
            name,
            module_class: entry.module_class.clone(),
            path: format!("{}/", self.module_folder(entry, env)),
            position,
            animate_in: entry.animate_in.clone(),
            animate_out: entry.animate_out.clone(),
            hidden_on_startup: entry.hidden_on_startup,
            header: entry.header.clone(),
            merge_strategy: MergeStrategy::from_flag(entry.config_deep_merge),
            config: entry.config.clone(),
            classes,
        }
    }
}

/// Resolve modules with the default resolver settings
pub fn resolve_modules(
    configured: &[ModuleEntry],
    system: &[ModuleEntry],
    env: &EnvVars,
    available_positions: &[String],
) -> Vec<ModuleDescriptor> {
    ModuleResolver::default()
        .resolve(configured, system, env, available_positions)
        .descriptors
}
