//! # Stratum Core Kernel Errors
//!
//! Defines the crate-level [`Error`] type.
//!
//! Subsystem errors ([`PluginSystemError`] for registry, scanning and lookup,
//! [`ConfigError`] for settings) are wrapped through `#[from]` so facade
//! operations can return a single [`Result`] while callers still match on the
//! typed subsystem variant.
use std::path::PathBuf;
use std::result::Result as StdResult;

use crate::config::error::ConfigError;
use crate::plugin_system::error::PluginSystemError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Settings could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error during operation '{operation}' on path '{}': {source}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        operation: String,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Helper to create an I/O error with context
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::Io {
            source,
            operation: operation.into(),
            path,
        }
    }

    /// The wrapped plugin system error, if this is one.
    pub fn as_plugin_system(&self) -> Option<&PluginSystemError> {
        match self {
            Error::PluginSystem(e) => Some(e),
            _ => None,
        }
    }
}
