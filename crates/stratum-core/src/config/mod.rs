//! # Stratum Core Configuration
//!
//! The settings object consumed by the plugin manager: directory-list roots
//! (`plugin_path`), search-path roots, the search-path namespace, the
//! diagnostic and strict flags, and declarative category declarations for
//! hosts that define their categories in configuration rather than code.
//!
//! Settings are read from JSON, YAML (`yaml-config`) or TOML (`toml-config`)
//! files picked by extension, then overlaid with `STRATUM_*` environment
//! variables.
pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{CategoryDecl, ConfigFormat, PluginSettings};
