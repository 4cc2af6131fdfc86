#![cfg(test)]

use std::fs;

use tempfile::tempdir;

use crate::config::PluginSettings;
use crate::plugin_system::manager::{DefaultPluginManager, PluginManager};

use super::common::{extension, extensions_dir, on_test, package_repository, PACKAGE_REPOSITORY};

#[tokio::test]
async fn test_settings_file_drives_resolution() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("stratum.json");
    let config = serde_json::json!({
        "plugin_path": [extension("non-mod")],
        "search_path": [extensions_dir()],
        "debug_plugins": true
    });
    fs::write(&config_path, config.to_string()).unwrap();

    let settings = PluginSettings::load(&config_path).unwrap();
    assert!(settings.debug_plugins);
    let manager = DefaultPluginManager::new(settings);
    manager.register_plugin_type(package_repository()).await.unwrap();

    assert_eq!(on_test(&manager, "memory").await, "bar");
}

#[tokio::test]
async fn test_environment_overlay_appends_roots() {
    let non_mod = extension("non-mod").display().to_string();
    let search = extensions_dir().display().to_string();
    let settings = PluginSettings::default()
        .with_overrides_from(|key| match key {
            "STRATUM_PLUGIN_PATH" => Some(non_mod.clone()),
            "STRATUM_PATH" => Some(search.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(settings.plugin_path, vec![extension("non-mod")]);

    let manager = DefaultPluginManager::new(settings);
    manager.register_plugin_type(package_repository()).await.unwrap();
    assert_eq!(on_test(&manager, "memory").await, "bar");
}

#[cfg(feature = "yaml-config")]
#[tokio::test]
async fn test_declared_category_from_yaml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("stratum.yaml");
    fs::write(
        &config_path,
        format!(
            "search_path:\n  - {}\ncategories:\n  - name: {}\n    requires: [fetch]\n",
            extensions_dir().display(),
            PACKAGE_REPOSITORY
        ),
    )
    .unwrap();

    let manager = DefaultPluginManager::new(PluginSettings::load(&config_path).unwrap());
    manager.register_declared_categories().await.unwrap();
    assert_eq!(
        manager.list_plugins(PACKAGE_REPOSITORY).await.unwrap(),
        vec!["cloud".to_string(), "memory".to_string()]
    );
}
