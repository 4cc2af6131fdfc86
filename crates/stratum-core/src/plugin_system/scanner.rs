use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::path::PathBuf;

use crate::plugin_system::category::PluginCategory;
use crate::plugin_system::conflict::LoadFailureRecord;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::{LoadableUnit, ModuleLoader};
use crate::plugin_system::source::{LoadedImplementation, PluginSource, Provenance, SourceKind};
use crate::utils::fs::sorted_entries;

/// Enumerates one source for one category.
pub struct SourceScanner<'a> {
    loader: &'a dyn ModuleLoader,
    strict: bool,
    verbose: bool,
}

impl<'a> SourceScanner<'a> {
    pub fn new(loader: &'a dyn ModuleLoader) -> Self {
        Self {
            loader,
            strict: false,
            verbose: false,
        }
    }

    /// Surface the first load failure instead of skipping it.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Report enumeration at info level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Start a scan. Nothing touches the filesystem until the first `next()`.
    pub fn scan<'s>(&self, source: &'s PluginSource, category: &'s PluginCategory) -> Scan<'a, 's> {
        Scan {
            loader: self.loader,
            strict: self.strict,
            verbose: self.verbose,
            kind: source.kind(),
            category,
            dirs: source.category_dirs(category.id()).into(),
            root: None,
            units: VecDeque::new(),
            pending: VecDeque::new(),
            scanned: Vec::new(),
            failures: Vec::new(),
            done: false,
        }
    }
}

/// A lazy, single-use pass over one source.
///
/// Yields implementations in precedence order: roots in configured order, units
/// in file-name order, implementations in declaration order. In strict mode the
/// first failure is yielded as an error and ends the scan.
pub struct Scan<'a, 's> {
    loader: &'a dyn ModuleLoader,
    strict: bool,
    verbose: bool,
    kind: SourceKind,
    category: &'s PluginCategory,
    dirs: VecDeque<(PathBuf, PathBuf)>,
    root: Option<PathBuf>,
    units: VecDeque<LoadableUnit>,
    pending: VecDeque<LoadedImplementation>,
    scanned: Vec<PathBuf>,
    failures: Vec<LoadFailureRecord>,
    done: bool,
}

impl Scan<'_, '_> {
    /// Category directories that existed and were enumerated so far
    pub fn scanned_dirs(&self) -> &[PathBuf] {
        &self.scanned
    }

    /// Failures skipped so far.
    pub fn take_failures(&mut self) -> Vec<LoadFailureRecord> {
        std::mem::take(&mut self.failures)
    }

    fn report(&self, message: std::fmt::Arguments<'_>) {
        if self.verbose {
            log::info!("{}", message);
        } else {
            log::debug!("{}", message);
        }
    }

    /// Record or surface a failure. Returns the error to yield in strict mode.
    fn fail(&mut self, error: PluginSystemError) -> Option<PluginSystemError> {
        if self.strict {
            self.done = true;
            return Some(error);
        }
        log::warn!("Skipping plugin unit: {}", error);
        self.failures.push(LoadFailureRecord::from_error(self.kind, &error));
        None
    }

    /// Move to the next existing category directory. Returns false when exhausted.
    fn advance_dir(&mut self) -> Result<bool, PluginSystemError> {
        while let Some((root, dir)) = self.dirs.pop_front() {
            if !dir.is_dir() {
                log::debug!(
                    "No '{}' directory under {} root {}",
                    self.category.id(),
                    self.kind,
                    root.display()
                );
                continue;
            }
            let entries = sorted_entries(&dir).map_err(|e| PluginSystemError::LoadFailure {
                category: self.category.id().to_string(),
                unit: dir.clone(),
                message: "failed to read category directory".to_string(),
                source: Some(Box::new(e.into())),
            })?;
            self.report(format_args!(
                "Scanning {} directory {} for category '{}'",
                self.kind,
                dir.display(),
                self.category.id()
            ));
            self.units = entries
                .iter()
                .filter_map(|path| {
                    let unit = LoadableUnit::classify(self.category.id(), path);
                    if unit.is_none() {
                        log::debug!("Ignoring {}: not a plugin unit", path.display());
                    }
                    unit
                })
                .collect();
            self.scanned.push(dir);
            self.root = Some(root);
            return Ok(true);
        }
        Ok(false)
    }

    fn load_unit(&mut self, unit: LoadableUnit) -> Result<(), PluginSystemError> {
        let classes = self.loader.load(&unit)?;
        let root = self.root.clone().unwrap_or_default();
        let mut loaded = Vec::with_capacity(classes.len());
        for class in classes {
            self.category.contract().check(class.as_ref()).map_err(|reason| {
                PluginSystemError::load_failure(self.category.id(), unit.path.clone(), reason)
            })?;
            log::debug!("Found '{}' in {}", class.name(), unit.path.display());
            loaded.push(LoadedImplementation {
                category: self.category.id().to_string(),
                name: class.name().to_string(),
                class,
                provenance: Provenance::discovered(self.kind, &root, &unit.path),
            });
        }
        // A unit contributes all of its implementations or none.
        self.pending.extend(loaded);
        Ok(())
    }
}

impl Iterator for Scan<'_, '_> {
    type Item = Result<LoadedImplementation, PluginSystemError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(implementation) = self.pending.pop_front() {
                return Some(Ok(implementation));
            }
            if self.done {
                return None;
            }
            if let Some(unit) = self.units.pop_front() {
                if let Err(e) = self.load_unit(unit) {
                    if let Some(e) = self.fail(e) {
                        return Some(Err(e));
                    }
                }
                continue;
            }
            match self.advance_dir() {
                Ok(true) => continue,
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    if let Some(e) = self.fail(e) {
                        return Some(Err(e));
                    }
                }
            }
        }
    }
}

impl FusedIterator for Scan<'_, '_> {}
