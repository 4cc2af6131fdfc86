use std::collections::BTreeMap;

use crate::plugin_system::category::PluginCategory;
use crate::plugin_system::error::PluginSystemError;

/// The set of known plugin categories.
///
/// Registration only records the category; nothing is scanned until the
/// first lookup through the manager.
#[derive(Debug, Default)]
pub struct PluginTypeRegistry {
    categories: BTreeMap<String, PluginCategory>,
}

impl PluginTypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            categories: BTreeMap::new(),
        }
    }

    /// Register a new category, rejecting an identifier that already exists.
    pub fn register_category(&mut self, category: PluginCategory) -> Result<(), PluginSystemError> {
        category.validate()?;
        if self.categories.contains_key(category.id()) {
            return Err(PluginSystemError::DuplicateCategory {
                category: category.id().to_string(),
            });
        }
        self.categories.insert(category.id().to_string(), category);
        Ok(())
    }

    /// Register or replace a category, returning the previous definition.
    ///
    /// This is the explicit reset path; plain registration never replaces.
    pub fn replace_category(
        &mut self,
        category: PluginCategory,
    ) -> Result<Option<PluginCategory>, PluginSystemError> {
        category.validate()?;
        Ok(self.categories.insert(category.id().to_string(), category))
    }

    /// Check if a category is registered
    pub fn contains(&self, id: &str) -> bool {
        self.categories.contains_key(id)
    }

    /// Get a category by identifier
    pub fn get(&self, id: &str) -> Option<&PluginCategory> {
        self.categories.get(id)
    }

    /// Known identifiers, sorted
    pub fn list_categories(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Remove every category
    pub fn clear(&mut self) {
        self.categories.clear();
    }
}
