//! # Stratum Core Plugin System Errors
//!
//! Defines [`PluginSystemError`], the typed errors of the registry, the
//! scanner and the lookup facade.
//!
//! Lookup misses ([`UnknownCategory`](PluginSystemError::UnknownCategory),
//! [`PluginNotFound`](PluginSystemError::PluginNotFound)) are always surfaced to
//! the caller. [`LoadFailure`](PluginSystemError::LoadFailure) is per unit and
//! only reaches callers when strict mode is on; otherwise the scanner records
//! it and moves on.
use std::path::PathBuf;
use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Unknown plugin category '{category}'")]
    UnknownCategory { category: String },

    #[error("No plugin named '{name}' in category '{category}'")]
    PluginNotFound { category: String, name: String },

    #[error("Failed to load plugin unit '{}' for category '{category}': {message}", unit.display())]
    LoadFailure {
        category: String,
        unit: PathBuf,
        message: String,
        #[source]
        source: Option<Box<PluginSystemErrorSource>>,
    },

    #[error("Plugin category '{category}' is already registered")]
    DuplicateCategory { category: String },

    #[error("Invalid plugin category '{category}': {message}")]
    InvalidCategory { category: String, message: String },

    #[error("Plugin manifest error for '{}': {message}", path.display())]
    Manifest {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemErrorSource {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Dynamic library error: {0}")]
    Library(#[from] libloading::Error),
}

impl PluginSystemError {
    /// Build a per-unit load failure without an underlying cause.
    pub fn load_failure(category: &str, unit: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PluginSystemError::LoadFailure {
            category: category.to_string(),
            unit: unit.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Re-wrap any error raised while loading `unit` as a load failure.
    ///
    /// Errors that already are load failures are returned unchanged.
    pub fn into_load_failure(self, category: &str, unit: impl Into<PathBuf>) -> Self {
        match self {
            e @ PluginSystemError::LoadFailure { .. } => e,
            other => PluginSystemError::LoadFailure {
                category: category.to_string(),
                unit: unit.into(),
                message: other.to_string(),
                source: None,
            },
        }
    }

    /// Whether this error describes a single unit that could be skipped.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, PluginSystemError::LoadFailure { .. })
    }
}
