use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::PluginSettings;
use crate::plugin_system::category::PluginCategory;
use crate::plugin_system::conflict::{OverrideRecord, ResolutionReport};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::ModuleLoader;
use crate::plugin_system::scanner::SourceScanner;
use crate::plugin_system::source::{LoadedImplementation, PluginSource};
use crate::plugin_system::traits::PluginClass;

/// The resolved view of one category: one visible implementation per name.
#[derive(Debug, Clone)]
pub struct EffectiveImplementationTable {
    category: String,
    entries: BTreeMap<String, LoadedImplementation>,
    report: ResolutionReport,
}

impl EffectiveImplementationTable {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn get(&self, name: &str) -> Option<&LoadedImplementation> {
        self.entries.get(name)
    }

    pub fn class(&self, name: &str) -> Option<Arc<dyn PluginClass>> {
        self.entries.get(name).map(|entry| entry.class.clone())
    }

    /// Visible names, sorted
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadedImplementation> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn report(&self) -> &ResolutionReport {
        &self.report
    }
}

/// Tables are equal when they expose the same implementations from the same
/// origins; the report is not compared.
impl PartialEq for EffectiveImplementationTable {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((a_name, a), (b_name, b))| a_name == b_name && a.same_identity(b))
    }
}

/// Folds built-ins and every configured source into a table.
pub struct OverrideResolver<'a> {
    loader: &'a dyn ModuleLoader,
}

impl<'a> OverrideResolver<'a> {
    pub fn new(loader: &'a dyn ModuleLoader) -> Self {
        Self { loader }
    }

    /// Resolve `category` against `settings`.
    ///
    /// Start from the built-ins, then fold the directory list and the search
    /// path in scan order; every later entry replaces an earlier one of the
    /// same name. Only strict mode makes this fail.
    pub fn resolve(
        &self,
        category: &PluginCategory,
        settings: &PluginSettings,
    ) -> Result<EffectiveImplementationTable, PluginSystemError> {
        let verbose = settings.debug_plugins;
        let mut entries = BTreeMap::new();
        let mut report = ResolutionReport::new(category.id());

        for class in category.built_ins() {
            let implementation = LoadedImplementation::built_in(category.id(), class.clone());
            entries.insert(implementation.name.clone(), implementation);
        }

        let scanner = SourceScanner::new(self.loader)
            .strict(settings.strict_plugins)
            .verbose(verbose);

        for source in PluginSource::from_settings(settings) {
            if source.is_empty() {
                continue;
            }
            let mut scan = scanner.scan(&source, category);
            for item in scan.by_ref() {
                let implementation = item?;
                if let Some(shadowed) = entries.get(&implementation.name) {
                    let record = OverrideRecord::new(&implementation, shadowed);
                    if verbose {
                        log::info!("Plugin override in '{}': {}", category.id(), record.description());
                    } else {
                        log::debug!("Plugin override in '{}': {}", category.id(), record.description());
                    }
                    report.overrides.push(record);
                }
                entries.insert(implementation.name.clone(), implementation);
            }
            report.scanned_dirs.extend(scan.scanned_dirs().iter().cloned());
            report.failures.extend(scan.take_failures());
        }

        let table = EffectiveImplementationTable {
            category: category.id().to_string(),
            entries,
            report,
        };
        if verbose {
            log::info!(
                "Resolved category '{}': {} implementation(s), {} override(s), {} skipped unit(s)",
                table.category,
                table.len(),
                table.report.overrides.len(),
                table.report.failures.len()
            );
        } else {
            log::debug!(
                "Resolved category '{}': {} implementation(s)",
                table.category,
                table.len()
            );
        }
        Ok(table)
    }
}
