use std::fmt::Write;
use std::path::{Path, PathBuf};

use stratum_core::config::PluginSettings;
use stratum_core::kernel::error::Result;
use stratum_core::plugin_system::{EffectiveImplementationTable, PluginCategory, ResolutionReport};

/// Install `env_logger`; `--debug-plugins` raises the default level to info.
pub fn init_logging(debug_plugins: bool) {
    let default_level = if debug_plugins { "info" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

/// Settings from the file (if any) and the environment, with command-line
/// roots appended last so they take precedence within their tier.
pub fn build_settings(
    config: Option<&Path>,
    plugin_path: Vec<PathBuf>,
    search_root: Vec<PathBuf>,
    debug_plugins: bool,
    strict: bool,
) -> Result<PluginSettings> {
    let mut settings = match config {
        Some(path) => PluginSettings::load(path)?,
        None => PluginSettings::default(),
    }
    .with_env_overrides()?;

    settings.plugin_path.extend(plugin_path);
    settings.search_path.extend(search_root);
    settings.debug_plugins |= debug_plugins;
    settings.strict_plugins |= strict;
    Ok(settings)
}

pub fn render_categories(categories: &[PluginCategory]) -> String {
    let mut out = String::new();
    for category in categories {
        if let Some(description) = category.description() {
            writeln!(out, "{}\t{}", category.id(), description).ok();
        } else {
            writeln!(out, "{}", category.id()).ok();
        }
    }
    out
}

pub fn render_list(table: &EffectiveImplementationTable) -> String {
    let mut out = String::new();
    for implementation in table.iter() {
        writeln!(out, "{}\t{}", implementation.name, implementation.provenance).ok();
    }
    out
}

/// The winner for `name`, then every entry it shadowed, most recent first.
pub fn render_which(table: &EffectiveImplementationTable, name: &str) -> String {
    let mut out = String::new();
    if let Some(winner) = table.get(name) {
        writeln!(out, "{}", winner.provenance).ok();
    }
    for shadowed in table.report().shadowed_by(name).into_iter().rev() {
        writeln!(out, "  shadows {}", shadowed).ok();
    }
    out
}

pub fn render_report(report: &ResolutionReport) -> String {
    let mut out = String::new();
    writeln!(out, "category: {}", report.category).ok();
    writeln!(out, "scanned:").ok();
    for dir in &report.scanned_dirs {
        writeln!(out, "  {}", dir.display()).ok();
    }
    writeln!(out, "overrides:").ok();
    for record in &report.overrides {
        writeln!(out, "  {}", record.description()).ok();
    }
    writeln!(out, "skipped:").ok();
    for failure in &report.failures {
        writeln!(out, "  [{}] {}", failure.source, failure.message).ok();
    }
    out
}
