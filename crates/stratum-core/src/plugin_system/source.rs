use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::PluginSettings;
use crate::plugin_system::traits::PluginClass;

/// Where an implementation came from, ordered by precedence rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    BuiltIn,
    DirectoryList,
    SearchPath,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::BuiltIn => "built-in",
            SourceKind::DirectoryList => "directory-list",
            SourceKind::SearchPath => "search-path",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A configured origin of candidate implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSource {
    /// Ordered directories, each holding `<dir>/<category>/`
    DirectoryList(Vec<PathBuf>),
    /// Ordered roots, each holding `<root>/<namespace>/<category>/`
    SearchPath { roots: Vec<PathBuf>, namespace: String },
}

impl PluginSource {
    /// Both configured sources in fold order: directory list, then search path.
    pub fn from_settings(settings: &PluginSettings) -> [PluginSource; 2] {
        [
            PluginSource::DirectoryList(settings.plugin_path.clone()),
            PluginSource::SearchPath {
                roots: settings.search_path.clone(),
                namespace: settings.namespace.clone(),
            },
        ]
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            PluginSource::DirectoryList(_) => SourceKind::DirectoryList,
            PluginSource::SearchPath { .. } => SourceKind::SearchPath,
        }
    }

    /// Configured roots, lowest priority first.
    pub fn roots(&self) -> &[PathBuf] {
        match self {
            PluginSource::DirectoryList(dirs) => dirs,
            PluginSource::SearchPath { roots, .. } => roots,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots().is_empty()
    }

    /// `(root, category directory)` pairs to enumerate for `category`, in scan order.
    pub fn category_dirs(&self, category: &str) -> Vec<(PathBuf, PathBuf)> {
        match self {
            PluginSource::DirectoryList(dirs) => dirs
                .iter()
                .map(|dir| (dir.clone(), dir.join(category)))
                .collect(),
            PluginSource::SearchPath { roots, namespace } => roots
                .iter()
                .map(|root| (root.clone(), root.join(namespace).join(category)))
                .collect(),
        }
    }
}

/// Where a loaded implementation was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub source: SourceKind,
    /// Configured root; `None` for built-ins
    pub root: Option<PathBuf>,
    /// Unit the implementation was loaded from; `None` for built-ins
    pub unit: Option<PathBuf>,
}

impl Provenance {
    pub fn built_in() -> Self {
        Self {
            source: SourceKind::BuiltIn,
            root: None,
            unit: None,
        }
    }

    pub fn discovered(source: SourceKind, root: &Path, unit: &Path) -> Self {
        Self {
            source,
            root: Some(root.to_path_buf()),
            unit: Some(unit.to_path_buf()),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} {}", self.source, unit.display()),
            None => f.write_str(self.source.label()),
        }
    }
}

/// An implementation together with the category and origin it was loaded for.
#[derive(Debug, Clone)]
pub struct LoadedImplementation {
    pub category: String,
    pub name: String,
    pub class: Arc<dyn PluginClass>,
    pub provenance: Provenance,
}

impl LoadedImplementation {
    pub fn built_in(category: &str, class: Arc<dyn PluginClass>) -> Self {
        Self {
            category: category.to_string(),
            name: class.name().to_string(),
            class,
            provenance: Provenance::built_in(),
        }
    }

    /// Same implementation from the same origin.
    ///
    /// Built-ins must be the very same object; discovered implementations are
    /// compared by provenance since a re-scan materializes fresh objects.
    pub fn same_identity(&self, other: &LoadedImplementation) -> bool {
        if self.category != other.category || self.name != other.name || self.provenance != other.provenance {
            return false;
        }
        match self.provenance.source {
            SourceKind::BuiltIn => Arc::ptr_eq(&self.class, &other.class),
            _ => true,
        }
    }
}
