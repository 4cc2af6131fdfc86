#![cfg(test)]

use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::PathBuf;

use tempfile::tempdir;

use crate::utils::fs::{has_extension, is_dynamic_library, is_private_name, sorted_entries};

#[test]
fn test_sorted_entries_orders_by_name() {
    let temp_dir = tempdir().unwrap();
    let base = temp_dir.path();
    for name in ["zeta.json", "alpha.json", "mid"] {
        if name.contains('.') {
            File::create(base.join(name)).unwrap();
        } else {
            fs::create_dir(base.join(name)).unwrap();
        }
    }

    let names: Vec<String> = sorted_entries(base)
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["alpha.json", "mid", "zeta.json"]);
}

#[test]
fn test_sorted_entries_missing_dir_errors() {
    let temp_dir = tempdir().unwrap();
    assert!(sorted_entries(temp_dir.path().join("absent")).is_err());
}

#[test]
fn test_private_names() {
    assert!(is_private_name(OsStr::new("_init.json")));
    assert!(is_private_name(OsStr::new(".hidden")));
    assert!(!is_private_name(OsStr::new("memory.json")));
}

#[test]
fn test_extension_checks() {
    let lib = PathBuf::from(format!("libthing.{}", std::env::consts::DLL_EXTENSION));
    assert!(is_dynamic_library(&lib));
    assert!(!is_dynamic_library("thing.json"));
    assert!(has_extension("thing.JSON", "json"));
    assert!(!has_extension("thing", "json"));
}
