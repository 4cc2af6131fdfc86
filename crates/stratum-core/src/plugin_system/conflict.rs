use std::path::PathBuf;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::source::{LoadedImplementation, Provenance, SourceKind};

/// One name collision settled during resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRecord {
    /// Implementation name both entries were registered under
    pub name: String,
    /// Provenance of the implementation that stayed visible
    pub winner: Provenance,
    /// Provenance of the implementation it replaced
    pub shadowed: Provenance,
}

impl OverrideRecord {
    pub fn new(winner: &LoadedImplementation, shadowed: &LoadedImplementation) -> Self {
        Self {
            name: winner.name.clone(),
            winner: winner.provenance.clone(),
            shadowed: shadowed.provenance.clone(),
        }
    }

    /// Whether the winner came from a higher precedence tier than the entry it
    /// replaced, as opposed to a later root of the same tier.
    pub fn crosses_tier(&self) -> bool {
        self.winner.source > self.shadowed.source
    }

    /// Whether a built-in was shadowed
    pub fn shadows_built_in(&self) -> bool {
        self.shadowed.source == SourceKind::BuiltIn
    }

    /// Get a human-readable description of this decision
    pub fn description(&self) -> String {
        let how = if self.crosses_tier() { "overrides" } else { "replaces" };
        format!("'{}': {} {} {}", self.name, self.winner, how, self.shadowed)
    }
}

/// A unit skipped during a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailureRecord {
    pub source: SourceKind,
    pub unit: Option<PathBuf>,
    pub message: String,
}

impl LoadFailureRecord {
    pub fn from_error(source: SourceKind, error: &PluginSystemError) -> Self {
        let unit = match error {
            PluginSystemError::LoadFailure { unit, .. } => Some(unit.clone()),
            PluginSystemError::Manifest { path, .. } => Some(path.clone()),
            _ => None,
        };
        Self {
            source,
            unit,
            message: error.to_string(),
        }
    }
}

/// Everything that happened while building one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionReport {
    pub category: String,
    /// Category directories that were enumerated, in scan order
    pub scanned_dirs: Vec<PathBuf>,
    /// Replacements in the order they happened
    pub overrides: Vec<OverrideRecord>,
    pub failures: Vec<LoadFailureRecord>,
}

impl ResolutionReport {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Self::default()
        }
    }

    /// Every decision about `name`, oldest first.
    pub fn overrides_for(&self, name: &str) -> Vec<&OverrideRecord> {
        self.overrides.iter().filter(|o| o.name == name).collect()
    }

    /// Provenance of every entry `name` shadowed, oldest first.
    pub fn shadowed_by(&self, name: &str) -> Vec<&Provenance> {
        self.overrides_for(name).into_iter().map(|o| &o.shadowed).collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
