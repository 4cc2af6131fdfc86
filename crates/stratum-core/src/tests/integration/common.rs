#![cfg(test)]

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::config::PluginSettings;
use crate::plugin_system::category::{CapabilityContract, PluginCategory};
use crate::plugin_system::manager::{DefaultPluginManager, PluginManager};
use crate::plugin_system::traits::PluginClass;

pub const PACKAGE_REPOSITORY: &str = "package_repository";

/// Host-side `memory` repository registered as a built-in.
#[derive(Debug)]
pub struct MemoryRepository;

impl PluginClass for MemoryRepository {
    fn name(&self) -> &str {
        "memory"
    }

    fn members(&self) -> Vec<String> {
        vec!["fetch".to_string()]
    }

    fn attribute(&self, key: &str) -> Option<Value> {
        (key == "on_test").then(|| Value::String("built-in".to_string()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Checked-in fixture tree under `tests/data/extensions`.
pub fn extensions_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("extensions")
}

pub fn extension(name: &str) -> PathBuf {
    extensions_dir().join(name)
}

pub fn package_repository() -> PluginCategory {
    PluginCategory::new(PACKAGE_REPOSITORY)
        .with_contract(CapabilityContract::new().require("fetch"))
        .with_built_in(Arc::new(MemoryRepository))
        .with_description("Where packages are fetched from")
}

/// A manager with `package_repository` registered.
pub async fn manager_with(settings: PluginSettings) -> DefaultPluginManager {
    let manager = DefaultPluginManager::new(settings);
    manager
        .register_plugin_type(package_repository())
        .await
        .expect("Failed to register package_repository");
    manager
}

pub async fn on_test(manager: &DefaultPluginManager, name: &str) -> String {
    manager
        .get_plugin_class(PACKAGE_REPOSITORY, name)
        .await
        .unwrap_or_else(|e| panic!("lookup of '{}' failed: {}", name, e))
        .attribute_str("on_test")
        .unwrap_or_default()
}
