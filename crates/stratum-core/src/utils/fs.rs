use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// List the immediate entries of `dir`, ordered by file name.
///
/// Directory enumeration order is unspecified on every platform; sorting keeps
/// scans deterministic, which the override fold depends on.
pub fn sorted_entries<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    entries.sort_by(|a, b| compare_file_names(a, b));
    Ok(entries)
}

fn compare_file_names(a: &Path, b: &Path) -> Ordering {
    a.file_name().cmp(&b.file_name())
}

/// Names starting with `_` or `.` are private to their directory and never
/// treated as units.
pub fn is_private_name(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('_') || name.starts_with('.')
}

/// Whether `path` carries the platform's dynamic library extension.
pub fn is_dynamic_library<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .map_or(false, |ext| ext == std::env::consts::DLL_EXTENSION)
}

/// Whether `path` has the given extension, compared case-insensitively.
pub fn has_extension<P: AsRef<Path>>(path: P, extension: &str) -> bool {
    path.as_ref()
        .extension()
        .map_or(false, |ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}
