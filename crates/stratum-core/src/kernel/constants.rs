/// Conventional namespace searched for under every search-path root
pub const DEFAULT_PLUGIN_NAMESPACE: &str = "stratum_plugins";

/// Manifest file inside a package unit
pub const PACKAGE_MANIFEST_FILE: &str = "manifest.json";

/// Extension of a declarative (single-file) unit
pub const MANIFEST_UNIT_EXTENSION: &str = "json";

/// Symbol exported by native units; returns the unit manifest as a C string
pub const NATIVE_MANIFEST_SYMBOL: &[u8] = b"stratum_plugin_manifest\0";

/// Extra directory-list roots, split with the platform path separator
pub const ENV_PLUGIN_PATH: &str = "STRATUM_PLUGIN_PATH";

/// Extra search-path roots, split with the platform path separator
pub const ENV_SEARCH_PATH: &str = "STRATUM_PATH";

/// Enables diagnostic reporting of scans and override decisions
pub const ENV_DEBUG_PLUGINS: &str = "STRATUM_DEBUG_PLUGINS";

/// Turns per-unit load failures into lookup errors
pub const ENV_STRICT_PLUGINS: &str = "STRATUM_STRICT_PLUGINS";
