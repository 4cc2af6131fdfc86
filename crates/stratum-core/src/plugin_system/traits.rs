use std::any::Any;
use std::fmt;

use crate::plugin_system::version::VersionRange;

/// The capability interface every plugin implementation exposes.
///
/// A category's [`CapabilityContract`](crate::plugin_system::CapabilityContract)
/// is checked against this surface when an implementation is loaded or a
/// built-in is registered. Hosts implement it for their built-in types and
/// recover the concrete type through [`as_any`](PluginClass::as_any);
/// discovered units are materialized by the module loader.
pub trait PluginClass: Send + Sync + fmt::Debug {
    /// Name the implementation is registered under inside its category
    fn name(&self) -> &str;

    /// Capabilities this implementation provides, matched against the
    /// category's required members
    fn members(&self) -> Vec<String> {
        Vec::new()
    }

    /// API versions this implementation accepts. Empty means unconstrained.
    fn api_versions(&self) -> Vec<VersionRange> {
        Vec::new()
    }

    /// Free-form metadata attribute
    fn attribute(&self, _key: &str) -> Option<serde_json::Value> {
        None
    }

    fn description(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn PluginClass {
    /// Convenience accessor for string-valued attributes.
    pub fn attribute_str(&self, key: &str) -> Option<String> {
        match self.attribute(key)? {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Downcast to a concrete built-in type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Whether the implementation lists `member` among its capabilities.
    pub fn provides(&self, member: &str) -> bool {
        member == "name" || self.members().iter().any(|m| m == member)
    }
}
