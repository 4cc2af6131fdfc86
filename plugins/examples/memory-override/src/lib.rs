//! Native plugin unit for the `package_repository` category.
//!
//! Drop the built library into `<dir>/package_repository/` of a directory-list
//! root, or into `<root>/stratum_plugins/package_repository/` of a search
//! root, to override the host's built-in `memory` repository.
use std::ffi::CStr;
use std::os::raw::c_char;

/// Manifest returned to the host. Static, so the pointer stays valid for as
/// long as the library is loaded.
static MANIFEST: &CStr = c"{\"plugins\":[{\"name\":\"memory\",\"members\":[\"fetch\",\"publish\"],\"api_versions\":[\">=0.1.0, <0.2.0\"],\"attributes\":{\"on_test\":\"native\"},\"description\":\"Memory repository shipped as a native unit\"}]}";

#[unsafe(no_mangle)]
pub extern "C-unwind" fn stratum_plugin_manifest() -> *const c_char {
    MANIFEST.as_ptr()
}
