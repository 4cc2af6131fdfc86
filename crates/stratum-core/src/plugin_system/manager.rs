use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OnceCell, RwLock};

use crate::config::PluginSettings;
use crate::kernel::component::KernelComponent;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::category::PluginCategory;
use crate::plugin_system::conflict::ResolutionReport;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::{DefaultModuleLoader, ModuleLoader};
use crate::plugin_system::registry::PluginTypeRegistry;
use crate::plugin_system::resolver::{EffectiveImplementationTable, OverrideResolver};
use crate::plugin_system::traits::PluginClass;

/// Plugin system component interface
#[async_trait]
pub trait PluginManager: KernelComponent {
    /// Register a new category. Fails if the identifier is taken.
    async fn register_plugin_type(&self, category: PluginCategory) -> Result<()>;

    /// Register or replace a category, returning the previous definition.
    async fn replace_plugin_type(&self, category: PluginCategory) -> Result<Option<PluginCategory>>;

    /// Look up the visible implementation of `name`, scanning on first use.
    ///
    /// The scan reads the filesystem and opens libraries on tokio's blocking
    /// pool, not on the calling worker.
    async fn get_plugin_class(&self, category: &str, name: &str) -> Result<Arc<dyn PluginClass>>;

    /// Registered category identifiers, sorted
    async fn list_categories(&self) -> Result<Vec<String>>;

    /// Visible implementation names of a category, sorted
    async fn list_plugins(&self, category: &str) -> Result<Vec<String>>;

    /// The resolved table of a category, scanning on first use.
    async fn effective_table(&self, category: &str) -> Result<Arc<EffectiveImplementationTable>>;

    /// Overrides, skipped units and scanned directories of the current table
    async fn resolution_report(&self, category: &str) -> Result<ResolutionReport>;

    /// Drop cached tables and loader memoization for one category, or all.
    ///
    /// A lookup that starts after this returns sees neither the old table
    /// nor any unit memoized before it.
    async fn invalidate(&self, category: Option<&str>) -> Result<()>;
}

/// Cache slot for one category's table.
///
/// Concurrent first lookups share the slot, so only one of them resolves.
/// Invalidation detaches the slot from the map instead of clearing it.
#[derive(Debug, Default)]
struct TableSlot {
    table: OnceCell<Arc<EffectiveImplementationTable>>,
}

/// Default implementation of plugin manager
#[derive(Clone)]
pub struct DefaultPluginManager {
    name: &'static str,
    registry: Arc<RwLock<PluginTypeRegistry>>,
    settings: Arc<RwLock<PluginSettings>>,
    loader: Arc<dyn ModuleLoader>,
    tables: Arc<RwLock<HashMap<String, Arc<TableSlot>>>>,
}

impl DefaultPluginManager {
    /// Create a manager that loads units with [`DefaultModuleLoader`].
    pub fn new(settings: PluginSettings) -> Self {
        Self::with_loader(settings, Arc::new(DefaultModuleLoader::new()))
    }

    /// Create a manager with a custom loader.
    pub fn with_loader(settings: PluginSettings, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            name: "DefaultPluginManager",
            registry: Arc::new(RwLock::new(PluginTypeRegistry::new())),
            settings: Arc::new(RwLock::new(settings)),
            loader,
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get reference to the category registry
    pub fn registry(&self) -> &Arc<RwLock<PluginTypeRegistry>> {
        &self.registry
    }

    pub fn loader(&self) -> &Arc<dyn ModuleLoader> {
        &self.loader
    }

    /// Snapshot of the current settings
    pub async fn settings(&self) -> PluginSettings {
        self.settings.read().await.clone()
    }

    /// Replace the settings; every category is re-scanned on next lookup.
    pub async fn update_settings(&self, settings: PluginSettings) -> Result<()> {
        *self.settings.write().await = settings;
        self.invalidate(None).await
    }

    /// Register every category declared in the settings.
    ///
    /// Returns the number of categories registered.
    pub async fn register_declared_categories(&self) -> Result<usize> {
        let decls = self.settings.read().await.categories.clone();
        for decl in &decls {
            let category = PluginCategory::from_decl(decl)?;
            self.register_plugin_type(category).await?;
        }
        Ok(decls.len())
    }

    async fn drop_table(&self, category: &str) {
        self.tables.write().await.remove(category);
    }

    async fn slot(&self, category: &str) -> Result<Arc<TableSlot>> {
        if !self.registry.read().await.contains(category) {
            return Err(PluginSystemError::UnknownCategory {
                category: category.to_string(),
            }
            .into());
        }
        if let Some(slot) = self.tables.read().await.get(category) {
            return Ok(slot.clone());
        }
        let mut tables = self.tables.write().await;
        Ok(tables.entry(category.to_string()).or_default().clone())
    }

    async fn resolve(&self, category: &str) -> Result<Arc<EffectiveImplementationTable>> {
        let definition = self
            .registry
            .read()
            .await
            .get(category)
            .cloned()
            .ok_or_else(|| PluginSystemError::UnknownCategory {
                category: category.to_string(),
            })?;
        let settings = self.settings.read().await.clone();
        let loader = self.loader.clone();
        let table = tokio::task::spawn_blocking(move || {
            OverrideResolver::new(loader.as_ref()).resolve(&definition, &settings)
        })
        .await
        .map_err(|e| Error::Other(format!("Resolving plugin category '{}' did not complete: {}", category, e)))??;
        Ok(Arc::new(table))
    }
}

impl Debug for DefaultPluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // No locking in Debug
        f.debug_struct("DefaultPluginManager")
            .field("name", &self.name)
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KernelComponent for DefaultPluginManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        let settings = self.settings.read().await;
        for dir in &settings.plugin_path {
            if !dir.is_dir() {
                log::warn!("Configured plugin directory {} does not exist", dir.display());
            }
        }
        for root in &settings.search_path {
            if !root.is_dir() {
                log::warn!("Configured search root {} does not exist", root.display());
            } else if !root.join(&settings.namespace).is_dir() {
                log::debug!(
                    "Search root {} has no '{}' namespace",
                    root.display(),
                    settings.namespace
                );
            }
        }
        log::info!(
            "Plugin manager initialized with {} plugin dir(s) and {} search root(s)",
            settings.plugin_path.len(),
            settings.search_path.len()
        );
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.clear();
        self.loader.uncache(None);
        drop(tables);
        self.registry.write().await.clear();
        log::info!("Plugin manager stopped");
        Ok(())
    }
}

#[async_trait]
impl PluginManager for DefaultPluginManager {
    async fn register_plugin_type(&self, category: PluginCategory) -> Result<()> {
        let id = category.id().to_string();
        self.registry.write().await.register_category(category)?;
        self.drop_table(&id).await;
        log::debug!("Registered plugin category '{}'", id);
        Ok(())
    }

    async fn replace_plugin_type(&self, category: PluginCategory) -> Result<Option<PluginCategory>> {
        let id = category.id().to_string();
        let previous = self.registry.write().await.replace_category(category)?;
        let mut tables = self.tables.write().await;
        tables.remove(&id);
        self.loader.uncache(Some(&id));
        drop(tables);
        log::debug!("Replaced plugin category '{}'", id);
        Ok(previous)
    }

    async fn get_plugin_class(&self, category: &str, name: &str) -> Result<Arc<dyn PluginClass>> {
        let table = self.effective_table(category).await?;
        table.class(name).ok_or_else(|| {
            PluginSystemError::PluginNotFound {
                category: category.to_string(),
                name: name.to_string(),
            }
            .into()
        })
    }

    async fn list_categories(&self) -> Result<Vec<String>> {
        Ok(self.registry.read().await.list_categories())
    }

    async fn list_plugins(&self, category: &str) -> Result<Vec<String>> {
        Ok(self.effective_table(category).await?.names())
    }

    async fn effective_table(&self, category: &str) -> Result<Arc<EffectiveImplementationTable>> {
        let slot = self.slot(category).await?;
        let table = slot.table.get_or_try_init(|| self.resolve(category)).await?;
        Ok(table.clone())
    }

    async fn resolution_report(&self, category: &str) -> Result<ResolutionReport> {
        Ok(self.effective_table(category).await?.report().clone())
    }

    async fn invalidate(&self, category: Option<&str>) -> Result<()> {
        // The memo is cleared before any lookup can see the emptied map.
        let mut tables = self.tables.write().await;
        match category {
            Some(category) => {
                tables.remove(category);
            }
            None => tables.clear(),
        }
        self.loader.uncache(category);
        drop(tables);
        log::debug!("Invalidated plugin tables for {}", category.unwrap_or("all categories"));
        Ok(())
    }
}
