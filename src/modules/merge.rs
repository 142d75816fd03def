//! Configuration merging
//!
//! Instance configuration is layered over a module's declared defaults,
//! either key-by-key at the top level or recursively through nested objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How instance configuration is merged over module defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Top-level keys of the instance config replace the defaults
    #[default]
    Shallow,
    /// Nested objects are merged recursively
    Deep,
}

impl MergeStrategy {
    /// Strategy for a `configDeepMerge` flag; only an explicit `true` is deep
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => MergeStrategy::Deep,
            _ => MergeStrategy::Shallow,
        }
    }
}

/// Merge `overrides` over `defaults` using the given strategy
pub fn merge_config(
    defaults: &Map<String, Value>,
    overrides: &Map<String, Value>,
    strategy: MergeStrategy,
) -> Map<String, Value> {
    let mut merged = defaults.clone();
    match strategy {
        MergeStrategy::Shallow => {
            for (key, value) in overrides {
                merged.insert(key.clone(), value.clone());
            }
        }
        MergeStrategy::Deep => deep_merge_into(&mut merged, overrides),
    }
    merged
}

fn deep_merge_into(target: &mut Map<String, Value>, overrides: &Map<String, Value>) {
    for (key, value) in overrides {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge_into(existing, incoming);
            }
            // Arrays and scalars are replaced wholesale
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
