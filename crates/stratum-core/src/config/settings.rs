use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::config::error::ConfigError;
use crate::kernel::constants;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Deserialize `data` in this format. `path` is only used for error context.
    pub fn parse<T: DeserializeOwned>(&self, data: &str, path: &Path) -> Result<T, ConfigError> {
        let wrap = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::Deserialization {
            format: self.extension().to_string(),
            path: path.to_path_buf(),
            source,
        };
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| wrap(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| wrap(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| wrap(Box::new(e))),
        }
    }
}

/// A category declared in configuration instead of host code.
///
/// Declared categories have no built-in implementations; everything they offer
/// comes from the configured sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDecl {
    pub name: String,
    /// Members every implementation must expose besides `name`
    #[serde(default)]
    pub requires: Vec<String>,
    /// API version implementations must accept, when they declare any
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Settings consumed by the plugin manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    /// Directory-list roots, lowest priority first
    pub plugin_path: Vec<PathBuf>,
    /// Search-path roots, lowest priority first
    pub search_path: Vec<PathBuf>,
    /// Directory looked up under each search-path root
    pub namespace: String,
    /// Report every scan and override decision at info level
    pub debug_plugins: bool,
    /// Fail resolution on the first unit that cannot be loaded
    pub strict_plugins: bool,
    pub categories: Vec<CategoryDecl>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            plugin_path: Vec::new(),
            search_path: Vec::new(),
            namespace: constants::DEFAULT_PLUGIN_NAMESPACE.to_string(),
            debug_plugins: false,
            strict_plugins: false,
            categories: Vec::new(),
        }
    }
}

impl PluginSettings {
    /// Load settings from a JSON, YAML or TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::io(e, "read_settings", path.to_path_buf()))?;
        let settings: PluginSettings = format.parse(&content, path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Overlay the `STRATUM_*` variables of the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Overlay variables obtained from `lookup`.
    ///
    /// Path lists append to the configured roots, so environment roots take
    /// precedence over file roots of the same source kind.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(constants::ENV_PLUGIN_PATH) {
            self.plugin_path.extend(split_path_list(&value));
        }
        if let Some(value) = lookup(constants::ENV_SEARCH_PATH) {
            self.search_path.extend(split_path_list(&value));
        }
        if let Some(value) = lookup(constants::ENV_DEBUG_PLUGINS) {
            self.debug_plugins = parse_flag(constants::ENV_DEBUG_PLUGINS, &value)?;
        }
        if let Some(value) = lookup(constants::ENV_STRICT_PLUGINS) {
            self.strict_plugins = parse_flag(constants::ENV_STRICT_PLUGINS, &value)?;
        }
        Ok(self)
    }

    /// Builder-style setter used by hosts and tests.
    pub fn with_plugin_path<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.plugin_path = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_path<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_path = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_debug_plugins(mut self, enabled: bool) -> Self {
        self.debug_plugins = enabled;
        self
    }

    pub fn with_strict_plugins(mut self, enabled: bool) -> Self {
        self.strict_plugins = enabled;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let namespace = self.namespace.trim();
        if namespace.is_empty() || namespace.contains(['/', '\\']) || namespace == "." || namespace == ".." {
            return Err(ConfigError::InvalidValue {
                key: "namespace".to_string(),
                message: format!("'{}' is not a single directory name", self.namespace),
            });
        }
        for decl in &self.categories {
            if decl.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "categories".to_string(),
                    message: "category declared without a name".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn split_path_list(value: &str) -> Vec<PathBuf> {
    env::split_paths(value)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}
