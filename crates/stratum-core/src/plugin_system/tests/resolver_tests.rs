#![cfg(test)]

use std::sync::Arc;

use tempfile::tempdir;

use crate::config::PluginSettings;
use crate::plugin_system::category::PluginCategory;
use crate::plugin_system::loader::DefaultModuleLoader;
use crate::plugin_system::resolver::OverrideResolver;
use crate::plugin_system::source::SourceKind;
use crate::plugin_system::tests::support::{manifest_json, write_unit, TestPlugin};

const CATEGORY: &str = "package_repository";

fn category_with_memory() -> PluginCategory {
    PluginCategory::new(CATEGORY).with_built_in(TestPlugin::new("memory").shared())
}

#[test]
fn test_no_sources_equals_built_ins() {
    let loader = DefaultModuleLoader::new();
    let category = category_with_memory();
    let table = OverrideResolver::new(&loader)
        .resolve(&category, &PluginSettings::default())
        .unwrap();

    assert_eq!(table.names(), vec!["memory".to_string()]);
    let memory = table.get("memory").unwrap();
    assert_eq!(memory.provenance.source, SourceKind::BuiltIn);
    assert!(Arc::ptr_eq(&memory.class, &category.built_ins()[0]));
    assert!(table.report().overrides.is_empty());
    assert!(table.report().scanned_dirs.is_empty());
}

#[test]
fn test_precedence_law() {
    let plugin_dir = tempdir().unwrap();
    let search_root = tempdir().unwrap();
    write_unit(plugin_dir.path(), CATEGORY, "memory.json", &manifest_json("memory", "dir"));
    write_unit(plugin_dir.path(), CATEGORY, "cloud.json", &manifest_json("cloud", "dir"));
    write_unit(
        &search_root.path().join("stratum_plugins"),
        CATEGORY,
        "cloud.json",
        &manifest_json("cloud", "search"),
    );

    let loader = DefaultModuleLoader::new();
    let settings = PluginSettings::default()
        .with_plugin_path([plugin_dir.path()])
        .with_search_path([search_root.path()]);
    let table = OverrideResolver::new(&loader)
        .resolve(&category_with_memory(), &settings)
        .unwrap();

    assert_eq!(table.names(), vec!["cloud".to_string(), "memory".to_string()]);
    // directory-list beats built-in
    assert_eq!(table.class("memory").unwrap().attribute_str("on_test").as_deref(), Some("dir"));
    // search-path beats directory-list
    assert_eq!(table.class("cloud").unwrap().attribute_str("on_test").as_deref(), Some("search"));
    assert_eq!(table.get("cloud").unwrap().provenance.source, SourceKind::SearchPath);

    let report = table.report();
    assert_eq!(report.overrides.len(), 2);
    assert!(report.overrides.iter().all(|o| o.crosses_tier()));
    assert!(report.overrides_for("memory")[0].shadows_built_in());
    assert_eq!(report.shadowed_by("cloud")[0].source, SourceKind::DirectoryList);
    assert_eq!(report.scanned_dirs.len(), 2);
}

#[test]
fn test_later_root_wins_within_tier() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write_unit(first.path(), CATEGORY, "memory.json", &manifest_json("memory", "first"));
    write_unit(second.path(), CATEGORY, "memory.json", &manifest_json("memory", "second"));

    let loader = DefaultModuleLoader::new();
    let settings = PluginSettings::default().with_plugin_path([first.path(), second.path()]);
    let table = OverrideResolver::new(&loader)
        .resolve(&PluginCategory::new(CATEGORY), &settings)
        .unwrap();

    assert_eq!(table.class("memory").unwrap().attribute_str("on_test").as_deref(), Some("second"));
    let record = &table.report().overrides[0];
    assert!(!record.crosses_tier());
    assert!(record.description().contains("replaces"));
}

#[test]
fn test_failures_are_reported_not_fatal() {
    let dir = tempdir().unwrap();
    write_unit(dir.path(), CATEGORY, "broken.json", "{ nope");
    write_unit(dir.path(), CATEGORY, "cloud.json", &manifest_json("cloud", "dir"));

    let loader = DefaultModuleLoader::new();
    let settings = PluginSettings::default().with_plugin_path([dir.path()]);
    let table = OverrideResolver::new(&loader)
        .resolve(&category_with_memory(), &settings)
        .unwrap();

    assert_eq!(table.names(), vec!["cloud".to_string(), "memory".to_string()]);
    assert!(table.report().has_failures());
    assert_eq!(table.report().failures[0].source, SourceKind::DirectoryList);
}

#[test]
fn test_strict_resolution_fails() {
    let dir = tempdir().unwrap();
    write_unit(dir.path(), CATEGORY, "broken.json", "{ nope");

    let loader = DefaultModuleLoader::new();
    let settings = PluginSettings::default()
        .with_plugin_path([dir.path()])
        .with_strict_plugins(true);
    let err = OverrideResolver::new(&loader)
        .resolve(&category_with_memory(), &settings)
        .unwrap_err();
    assert!(err.is_load_failure());
}

#[test]
fn test_rescan_is_equal_by_identity() {
    let dir = tempdir().unwrap();
    write_unit(dir.path(), CATEGORY, "cloud.json", &manifest_json("cloud", "dir"));

    let loader = DefaultModuleLoader::new();
    let category = category_with_memory();
    let settings = PluginSettings::default().with_plugin_path([dir.path()]);
    let resolver = OverrideResolver::new(&loader);

    let first = resolver.resolve(&category, &settings).unwrap();
    let second = resolver.resolve(&category, &settings).unwrap();
    assert_eq!(first, second);

    // Fresh objects from an uncached loader are still the same implementations.
    let fresh_loader = DefaultModuleLoader::new();
    let third = OverrideResolver::new(&fresh_loader).resolve(&category, &settings).unwrap();
    assert_eq!(first, third);

    // A different built-in object is not.
    let other = OverrideResolver::new(&loader)
        .resolve(&category_with_memory(), &settings)
        .unwrap();
    assert_ne!(first, other);
}
