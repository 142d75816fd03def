//! Translation tables
//!
//! A module ships JSON files mapping translation keys to text. The
//! configured language is loaded first, with an English table as fallback.

use std::collections::HashMap;
use std::path::Path;

use super::{ModuleError, ModuleResult};

/// Language used when a module has no table for the configured one
pub const FALLBACK_LANGUAGE: &str = "en";

/// Loaded translations of one module
#[derive(Debug, Clone, Default)]
pub struct Translator {
    primary: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON translation table
    pub async fn load_table(path: &Path) -> ModuleResult<HashMap<String, String>> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ModuleError::Translation {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;

        serde_json::from_str(&content).map_err(|e| ModuleError::Translation {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn set_primary(&mut self, table: HashMap<String, String>) {
        self.primary = table;
    }

    pub fn set_fallback(&mut self, table: HashMap<String, String>) {
        self.fallback = table;
    }

    /// Translate `key`, returning the key itself when no table has it
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        self.primary
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.fallback.is_empty()
    }
}
