#![cfg(test)]
//! Mocks and tree builders shared by the plugin system tests.

use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::{DefaultModuleLoader, LoadableUnit, ModuleLoader};
use crate::plugin_system::traits::PluginClass;
use crate::plugin_system::version::VersionRange;

/// A host-defined built-in.
#[derive(Debug)]
pub struct TestPlugin {
    pub name: String,
    pub members: Vec<String>,
    pub on_test: String,
}

impl TestPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: Vec::new(),
            on_test: "built-in".to_string(),
        }
    }

    pub fn with_members(mut self, members: &[&str]) -> Self {
        self.members = members.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn shared(self) -> Arc<dyn PluginClass> {
        Arc::new(self)
    }
}

impl PluginClass for TestPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> Vec<String> {
        self.members.clone()
    }

    fn api_versions(&self) -> Vec<VersionRange> {
        Vec::new()
    }

    fn attribute(&self, key: &str) -> Option<Value> {
        (key == "on_test").then(|| Value::String(self.on_test.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Write `<dir>/<category>/<file>` and return its path.
pub fn write_unit(dir: &Path, category: &str, file: &str, content: &str) -> PathBuf {
    let category_dir = dir.join(category);
    fs::create_dir_all(&category_dir).unwrap();
    let path = category_dir.join(file);
    fs::write(&path, content).unwrap();
    path
}

/// A single-declaration manifest carrying an `on_test` attribute.
pub fn manifest_json(name: &str, on_test: &str) -> String {
    serde_json::json!({
        "name": name,
        "attributes": { "on_test": on_test }
    })
    .to_string()
}

/// Delegates to [`DefaultModuleLoader`] and counts every `load` call.
#[derive(Debug, Default)]
pub struct CountingLoader {
    inner: DefaultModuleLoader,
    loads: AtomicUsize,
    uncaches: AtomicUsize,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn uncaches(&self) -> usize {
        self.uncaches.load(Ordering::SeqCst)
    }

    pub fn cached_units(&self) -> usize {
        self.inner.cached_units()
    }
}

impl ModuleLoader for CountingLoader {
    fn load(&self, unit: &LoadableUnit) -> Result<Vec<Arc<dyn PluginClass>>, PluginSystemError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(unit)
    }

    fn uncache(&self, category: Option<&str>) {
        self.uncaches.fetch_add(1, Ordering::SeqCst);
        self.inner.uncache(category)
    }
}

/// Delegates to [`DefaultModuleLoader`] but stalls inside `uncache` before
/// forgetting anything.
#[derive(Debug)]
pub struct SlowUncacheLoader {
    inner: DefaultModuleLoader,
    delay: Duration,
    uncaching: AtomicBool,
}

impl SlowUncacheLoader {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: DefaultModuleLoader::new(),
            delay,
            uncaching: AtomicBool::new(false),
        }
    }

    /// Whether an `uncache` call has started
    pub fn uncaching(&self) -> bool {
        self.uncaching.load(Ordering::SeqCst)
    }
}

impl ModuleLoader for SlowUncacheLoader {
    fn load(&self, unit: &LoadableUnit) -> Result<Vec<Arc<dyn PluginClass>>, PluginSystemError> {
        self.inner.load(unit)
    }

    fn uncache(&self, category: Option<&str>) {
        self.uncaching.store(true, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.inner.uncache(category)
    }
}
