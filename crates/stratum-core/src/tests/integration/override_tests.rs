#![cfg(test)]

use crate::config::PluginSettings;
use crate::plugin_system::manager::PluginManager;
use crate::plugin_system::source::SourceKind;

use super::common::{extension, extensions_dir, manager_with, on_test, PACKAGE_REPOSITORY};

#[tokio::test]
async fn test_built_in_only() {
    let manager = manager_with(PluginSettings::default()).await;
    assert_eq!(on_test(&manager, "memory").await, "built-in");
}

#[tokio::test]
async fn test_directory_list_overrides_built_in() {
    let manager = manager_with(PluginSettings::default().with_plugin_path([extension("non-mod")])).await;
    assert_eq!(on_test(&manager, "memory").await, "non-mod");
}

#[tokio::test]
async fn test_search_path_overrides_directory_list() {
    let settings = PluginSettings::default()
        .with_plugin_path([extension("non-mod")])
        .with_search_path([extensions_dir()]);
    let manager = manager_with(settings).await;
    assert_eq!(on_test(&manager, "memory").await, "bar");

    let which = manager.effective_table(PACKAGE_REPOSITORY).await.unwrap();
    let memory = which.get("memory").unwrap();
    assert_eq!(memory.provenance.source, SourceKind::SearchPath);
    let shadowed: Vec<SourceKind> = which
        .report()
        .shadowed_by("memory")
        .into_iter()
        .map(|p| p.source)
        .collect();
    assert_eq!(shadowed, vec![SourceKind::BuiltIn, SourceKind::DirectoryList]);
}

#[tokio::test]
async fn test_search_path_without_directory_list() {
    let manager = manager_with(PluginSettings::default().with_search_path([extensions_dir()])).await;
    assert_eq!(on_test(&manager, "memory").await, "bar");
}

#[tokio::test]
async fn test_adding_search_root_at_runtime() {
    let manager = manager_with(PluginSettings::default().with_plugin_path([extension("non-mod")])).await;
    assert_eq!(on_test(&manager, "memory").await, "non-mod");

    let settings = manager.settings().await.with_search_path([extensions_dir()]);
    manager.update_settings(settings).await.unwrap();
    assert_eq!(on_test(&manager, "memory").await, "bar");

    let settings = manager.settings().await.with_search_path(Vec::<std::path::PathBuf>::new());
    manager.update_settings(settings).await.unwrap();
    assert_eq!(on_test(&manager, "memory").await, "non-mod");
}

#[tokio::test]
async fn test_layered_directories() {
    let settings = PluginSettings::default().with_plugin_path([extension("foo"), extension("non-mod")]);
    let manager = manager_with(settings).await;
    assert_eq!(
        manager.list_plugins(PACKAGE_REPOSITORY).await.unwrap(),
        vec!["cloud".to_string(), "memory".to_string()]
    );
    assert_eq!(on_test(&manager, "cloud").await, "foo");
    assert_eq!(on_test(&manager, "memory").await, "non-mod");

    let settings = manager.settings().await.with_search_path([extensions_dir()]);
    manager.update_settings(settings).await.unwrap();
    assert_eq!(on_test(&manager, "cloud").await, "bar");
}

#[tokio::test]
async fn test_malformed_unit_does_not_hide_others() {
    let settings = PluginSettings::default()
        .with_plugin_path([extension("broken"), extension("foo")])
        .with_search_path([extensions_dir()]);
    let manager = manager_with(settings).await;

    assert_eq!(on_test(&manager, "sound").await, "broken-dir");
    assert_eq!(on_test(&manager, "memory").await, "bar");
    assert_eq!(on_test(&manager, "cloud").await, "bar");

    let report = manager.resolution_report(PACKAGE_REPOSITORY).await.unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0]
        .unit
        .as_ref()
        .is_some_and(|unit| unit.ends_with("half.json")));
    assert_eq!(report.scanned_dirs.len(), 3);
}
