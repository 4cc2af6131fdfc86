//! # Stratum Core Plugin System
//!
//! Named extension points ("categories") whose implementations come from three
//! tiers: built-ins registered by the host, a directory list (`plugin_path`)
//! and a search-path namespace located under every configured root.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`category`]** / **[`registry`]**: category definitions with their
//!   [`CapabilityContract`] and the [`PluginTypeRegistry`] that owns them.
//! - **[`source`]** / **[`scanner`]**: configured origins and the lazy
//!   [`Scan`] that enumerates their units for one category.
//! - **[`loader`]**: the [`ModuleLoader`] boundary turning a unit (JSON
//!   manifest, package directory or native library) into implementations.
//! - **[`resolver`]**: folds built-ins and sources into an
//!   [`EffectiveImplementationTable`] where a later entry always replaces an
//!   earlier one of the same name.
//! - **[`conflict`]**: override decisions and skipped units collected into a
//!   [`ResolutionReport`].
//! - **[`manager`]**: the [`PluginManager`] facade that resolves lazily, caches
//!   one table per category and invalidates on request.
//! - **[`error`]**, **[`manifest`]**, **[`traits`]**, **[`version`]**: typed
//!   errors, the unit manifest format, the [`PluginClass`] interface and
//!   semver helpers.
pub mod category;
pub mod conflict;
pub mod error;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod scanner;
pub mod source;
pub mod traits;
pub mod version;

pub use category::{CapabilityContract, PluginCategory};
pub use conflict::{LoadFailureRecord, OverrideRecord, ResolutionReport};
pub use error::PluginSystemError;
pub use loader::{DefaultModuleLoader, LoadableUnit, ModuleLoader, UnitKind};
pub use manager::{DefaultPluginManager, PluginManager};
pub use manifest::{DeclaredPlugin, UnitManifest};
pub use registry::PluginTypeRegistry;
pub use resolver::{EffectiveImplementationTable, OverrideResolver};
pub use scanner::{Scan, SourceScanner};
pub use source::{LoadedImplementation, PluginSource, Provenance, SourceKind};
pub use traits::PluginClass;
pub use version::{VersionError, VersionRange};

#[cfg(test)]
mod tests;
