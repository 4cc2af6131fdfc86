use std::collections::HashMap;
use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_char;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use libloading::{Library, Symbol};

use crate::kernel::constants;
use crate::plugin_system::error::{PluginSystemError, PluginSystemErrorSource};
use crate::plugin_system::manifest::UnitManifest;
use crate::plugin_system::traits::PluginClass;
use crate::utils::fs::{has_extension, is_dynamic_library, is_private_name};

/// How a unit is materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// `<stem>.json` declaring one or more implementations
    Manifest,
    /// Directory holding a `manifest.json`, optionally pointing at a library
    Package,
    /// Dynamic library exporting the manifest symbol
    Native,
}

/// A candidate found inside a category directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadableUnit {
    /// Category the unit was enumerated for
    pub category: String,
    pub path: PathBuf,
    pub kind: UnitKind,
}

impl LoadableUnit {
    /// Classify a directory entry, returning `None` for anything that is not
    /// a unit (private names, unrelated files, plain sub-directories).
    pub fn classify(category: &str, path: &Path) -> Option<Self> {
        let file_name = path.file_name()?;
        if is_private_name(file_name) {
            return None;
        }

        let kind = if path.is_dir() {
            if path.join(constants::PACKAGE_MANIFEST_FILE).is_file() {
                UnitKind::Package
            } else {
                return None;
            }
        } else if has_extension(path, constants::MANIFEST_UNIT_EXTENSION) {
            UnitKind::Manifest
        } else if is_dynamic_library(path) {
            UnitKind::Native
        } else {
            return None;
        };

        Some(Self {
            category: category.to_string(),
            path: path.to_path_buf(),
            kind,
        })
    }
}

/// The dynamic-loading boundary: turn a unit into the implementations it
/// defines, or fail.
pub trait ModuleLoader: Send + Sync + fmt::Debug {
    fn load(&self, unit: &LoadableUnit) -> Result<Vec<Arc<dyn PluginClass>>, PluginSystemError>;

    /// Forget memoized units for one category, or for all of them.
    fn uncache(&self, category: Option<&str>);
}

type UnitKey = (String, PathBuf);

/// Loads manifest, package and native units, memoizing each successfully
/// loaded unit until it is uncached.
///
/// Every `uncache` bumps a generation; a load that started under an older
/// generation returns its result but does not memoize it.
#[derive(Default)]
pub struct DefaultModuleLoader {
    cache: Mutex<HashMap<UnitKey, Vec<Arc<dyn PluginClass>>>>,
    generation: AtomicU64,
}

impl DefaultModuleLoader {
    /// Create a new loader with an empty memo
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized units
    pub fn cached_units(&self) -> usize {
        self.lock_cache().len()
    }

    /// Current memo generation
    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Memoize `classes` unless the memo was uncached since `generation`.
    pub(crate) fn memoize(&self, key: UnitKey, classes: Vec<Arc<dyn PluginClass>>, generation: u64) -> bool {
        let mut cache = self.lock_cache();
        if self.generation() != generation {
            log::debug!("Not memoizing {}: loader was uncached while loading", key.1.display());
            return false;
        }
        cache.insert(key, classes);
        true
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<UnitKey, Vec<Arc<dyn PluginClass>>>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load_uncached(unit: &LoadableUnit) -> Result<Vec<Arc<dyn PluginClass>>, PluginSystemError> {
        match unit.kind {
            UnitKind::Manifest => Ok(UnitManifest::read(&unit.path)?.into_classes(None)),
            UnitKind::Native => {
                let (manifest, library) = load_native_manifest(&unit.category, &unit.path)?;
                Ok(manifest.into_classes(Some(library)))
            }
            UnitKind::Package => {
                let manifest = UnitManifest::read(&unit.path.join(constants::PACKAGE_MANIFEST_FILE))?;
                match manifest.entry_point.clone() {
                    None => Ok(manifest.into_classes(None)),
                    Some(entry_point) => {
                        let library_path = package_entry_point(&unit.category, &unit.path, &entry_point)?;
                        let (native, library) = load_native_manifest(&unit.category, &library_path)?;
                        Ok(native.into_classes(Some(library)))
                    }
                }
            }
        }
    }
}

impl ModuleLoader for DefaultModuleLoader {
    fn load(&self, unit: &LoadableUnit) -> Result<Vec<Arc<dyn PluginClass>>, PluginSystemError> {
        let key = (unit.category.clone(), unit.path.clone());
        let generation = {
            let cache = self.lock_cache();
            if let Some(classes) = cache.get(&key) {
                log::debug!("Plugin unit {} served from loader cache", unit.path.display());
                return Ok(classes.clone());
            }
            self.generation()
        };

        // The lock is not held while loading; two racing loads of the same
        // unit both succeed and the later insert wins.
        let classes = Self::load_uncached(unit)
            .map_err(|e| e.into_load_failure(&unit.category, unit.path.clone()))?;
        if classes.is_empty() {
            return Err(PluginSystemError::load_failure(
                &unit.category,
                unit.path.clone(),
                "unit defines no plugins",
            ));
        }
        self.memoize(key, classes.clone(), generation);
        Ok(classes)
    }

    fn uncache(&self, category: Option<&str>) {
        let mut cache = self.lock_cache();
        self.generation.fetch_add(1, Ordering::SeqCst);
        match category {
            Some(category) => cache.retain(|(cached_category, _), _| cached_category != category),
            None => cache.clear(),
        }
    }
}

impl fmt::Debug for DefaultModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultModuleLoader")
            .field("cached_units", &self.cached_units())
            .finish()
    }
}

/// Resolve a package's entry point, refusing paths that leave the package.
fn package_entry_point(category: &str, package: &Path, entry_point: &str) -> Result<PathBuf, PluginSystemError> {
    if entry_point.contains("..") || Path::new(entry_point).is_absolute() {
        return Err(PluginSystemError::load_failure(
            category,
            package,
            format!(
                "invalid entry_point '{}': must be relative and not traverse upwards",
                entry_point
            ),
        ));
    }
    Ok(package.join(entry_point))
}

/// Open a native unit and read the manifest it exports.
fn load_native_manifest(category: &str, lib_path: &Path) -> Result<(UnitManifest, Arc<Library>), PluginSystemError> {
    type ManifestFn = unsafe extern "C-unwind" fn() -> *const c_char;

    let failure = |message: String, source: Option<PluginSystemErrorSource>| PluginSystemError::LoadFailure {
        category: category.to_string(),
        unit: lib_path.to_path_buf(),
        message,
        source: source.map(Box::new),
    };

    let library = unsafe { Library::new(lib_path) }
        .map_err(|e| failure("failed to open dynamic library".to_string(), Some(e.into())))?;

    let text = {
        let symbol: Symbol<ManifestFn> = unsafe { library.get(constants::NATIVE_MANIFEST_SYMBOL) }
            .map_err(|e| failure("missing manifest symbol".to_string(), Some(e.into())))?;
        let manifest_fn: ManifestFn = *symbol;

        let ptr = panic::catch_unwind(|| unsafe { manifest_fn() }).map_err(|panic_obj| {
            let panic_msg = if let Some(s_ref) = panic_obj.downcast_ref::<&'static str>() {
                (*s_ref).to_string()
            } else if let Some(s_obj) = panic_obj.downcast_ref::<String>() {
                s_obj.clone()
            } else {
                "Unknown panic reason".to_string()
            };
            failure(format!("manifest symbol panicked: {}", panic_msg), None)
        })?;
        if ptr.is_null() {
            return Err(failure("manifest symbol returned a null pointer".to_string(), None));
        }
        unsafe { CStr::from_ptr(ptr) }
            .to_str()
            .map(str::to_owned)
            .map_err(|_| failure("manifest is not valid UTF-8".to_string(), None))?
    };

    let manifest = UnitManifest::from_json(&text, lib_path)?;
    if manifest.entry_point.is_some() {
        return Err(failure("a native manifest cannot name another entry point".to_string(), None));
    }
    Ok((manifest, Arc::new(library)))
}
