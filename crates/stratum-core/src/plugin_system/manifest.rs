use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use libloading::Library;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::PluginClass;
use crate::plugin_system::version::VersionRange;

// --- Intermediate structs for deserialization ---

#[derive(Deserialize, Debug)]
struct RawPluginDecl {
    name: String,
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    api_versions: Vec<String>,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawMultiManifest {
    #[serde(default)]
    plugins: Vec<RawPluginDecl>,
    #[serde(default)]
    entry_point: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawSingleManifest {
    #[serde(flatten)]
    plugin: RawPluginDecl,
    #[serde(default)]
    entry_point: Option<String>,
}

// --- End Intermediate structs ---

/// One implementation declared by a unit manifest
#[derive(Debug, Clone)]
pub struct PluginDecl {
    pub name: String,
    pub members: Vec<String>,
    pub api_versions: Vec<VersionRange>,
    pub attributes: Map<String, Value>,
    pub description: Option<String>,
}

/// Parsed contents of a unit manifest.
///
/// Accepts either a single declaration or `{ "plugins": [...] }`.
#[derive(Debug, Clone)]
pub struct UnitManifest {
    /// Path the manifest was read from, or the library it was exported by
    pub origin: PathBuf,
    /// Library (relative to the package directory) that provides the plugins
    pub entry_point: Option<String>,
    pub plugins: Vec<PluginDecl>,
}

impl UnitManifest {
    /// Read and parse a manifest file.
    pub fn read(path: &Path) -> Result<Self, PluginSystemError> {
        let content = fs::read_to_string(path).map_err(|e| PluginSystemError::Manifest {
            path: path.to_path_buf(),
            message: "failed to read manifest".to_string(),
            source: Some(Box::new(e)),
        })?;
        Self::from_json(&content, path)
    }

    /// Parse manifest JSON; `origin` is kept for provenance and errors.
    pub fn from_json(content: &str, origin: &Path) -> Result<Self, PluginSystemError> {
        let manifest_err = |message: String, source: Option<serde_json::Error>| PluginSystemError::Manifest {
            path: origin.to_path_buf(),
            message,
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        };

        let value: Value = serde_json::from_str(content)
            .map_err(|e| manifest_err(format!("failed to parse manifest JSON: {}", e), Some(e)))?;

        if value.get("plugins").is_some() && value.get("name").is_some() {
            return Err(manifest_err(
                "manifest declares a top-level plugin and a plugins list".to_string(),
                None,
            ));
        }

        // A package manifest may consist of nothing but an entry point.
        let is_single = value.get("plugins").is_none() && value.get("name").is_some();
        let (raw_plugins, entry_point) = if !is_single {
            let raw: RawMultiManifest = serde_json::from_value(value)
                .map_err(|e| manifest_err(format!("invalid plugin list: {}", e), Some(e)))?;
            (raw.plugins, raw.entry_point)
        } else {
            let raw: RawSingleManifest = serde_json::from_value(value)
                .map_err(|e| manifest_err(format!("invalid plugin declaration: {}", e), Some(e)))?;
            (vec![raw.plugin], raw.entry_point)
        };

        match (&entry_point, raw_plugins.is_empty()) {
            (None, true) => {
                return Err(manifest_err("manifest declares no plugins".to_string(), None));
            }
            (Some(_), false) => {
                return Err(manifest_err(
                    "manifest declares plugins and an entry point; plugins of a native entry point come from the library".to_string(),
                    None,
                ));
            }
            _ => {}
        }

        let mut plugins = Vec::with_capacity(raw_plugins.len());
        for raw in raw_plugins {
            let mut api_versions = Vec::with_capacity(raw.api_versions.len());
            for constraint in &raw.api_versions {
                let range = VersionRange::from_str(constraint).map_err(|e| {
                    manifest_err(
                        format!("plugin '{}' has an invalid API version range: {}", raw.name, e),
                        None,
                    )
                })?;
                api_versions.push(range);
            }
            plugins.push(PluginDecl {
                name: raw.name,
                members: raw.members,
                api_versions,
                attributes: raw.attributes,
                description: raw.description,
            });
        }

        Ok(Self {
            origin: origin.to_path_buf(),
            entry_point,
            plugins,
        })
    }

    /// Materialize every declaration. `library` keeps a native unit loaded
    /// for as long as any of its implementations is alive.
    pub fn into_classes(self, library: Option<Arc<Library>>) -> Vec<Arc<dyn PluginClass>> {
        self.plugins
            .into_iter()
            .map(|decl| {
                Arc::new(DeclaredPlugin {
                    decl,
                    library: library.clone(),
                }) as Arc<dyn PluginClass>
            })
            .collect()
    }
}

/// An implementation materialized from a unit manifest.
#[derive(Debug)]
pub struct DeclaredPlugin {
    decl: PluginDecl,
    library: Option<Arc<Library>>,
}

impl DeclaredPlugin {
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.decl.attributes
    }

    /// Whether the implementation came from a native library
    pub fn is_native(&self) -> bool {
        self.library.is_some()
    }
}

impl PluginClass for DeclaredPlugin {
    fn name(&self) -> &str {
        &self.decl.name
    }

    fn members(&self) -> Vec<String> {
        self.decl.members.clone()
    }

    fn api_versions(&self) -> Vec<VersionRange> {
        self.decl.api_versions.clone()
    }

    fn attribute(&self, key: &str) -> Option<Value> {
        self.decl.attributes.get(key).cloned()
    }

    fn description(&self) -> Option<&str> {
        self.decl.description.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
