//! # Stratum Core
//!
//! Plugin category registry with layered discovery and override resolution.
//!
//! Hosts register categories, point [`PluginSettings`] at directory lists and
//! search-path roots, and look implementations up through the
//! [`PluginManager`] facade.
pub mod config;
pub mod kernel;
pub mod plugin_system;
pub mod utils;

pub use config::PluginSettings;
pub use kernel::error::{Error, Result};
pub use kernel::KernelComponent;
pub use plugin_system::{
    CapabilityContract, DefaultPluginManager, PluginCategory, PluginClass, PluginManager,
    PluginSystemError,
};

#[cfg(test)]
mod tests;
