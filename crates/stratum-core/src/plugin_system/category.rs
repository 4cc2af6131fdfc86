use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use semver::Version;

use crate::config::CategoryDecl;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::PluginClass;
use crate::plugin_system::version::parse_version;

/// What an implementation must expose to belong to a category.
///
/// `name` is always required and needs no listing. An `api_version` only
/// constrains implementations that declare `api_versions` at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityContract {
    required_members: Vec<String>,
    api_version: Option<Version>,
}

impl CapabilityContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, member: impl Into<String>) -> Self {
        let member = member.into();
        if member != "name" && !self.required_members.contains(&member) {
            self.required_members.push(member);
        }
        self
    }

    pub fn with_api_version(mut self, version: Version) -> Self {
        self.api_version = Some(version);
        self
    }

    pub fn required_members(&self) -> &[String] {
        &self.required_members
    }

    pub fn api_version(&self) -> Option<&Version> {
        self.api_version.as_ref()
    }

    /// Check `class` against the contract, describing the first violation.
    pub fn check(&self, class: &dyn PluginClass) -> Result<(), String> {
        let name = class.name();
        if name.trim().is_empty() {
            return Err("implementation has an empty name".to_string());
        }
        if name.chars().any(char::is_whitespace) {
            return Err(format!("implementation name '{}' contains whitespace", name));
        }

        let provided = class.members();
        let missing: Vec<&str> = self
            .required_members
            .iter()
            .filter(|m| !provided.iter().any(|p| p == *m))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(format!(
                "implementation '{}' is missing required member(s): {}",
                name,
                missing.join(", ")
            ));
        }

        if let Some(api_version) = &self.api_version {
            let ranges = class.api_versions();
            if !ranges.is_empty() && !ranges.iter().any(|r| r.includes(api_version)) {
                let declared: Vec<String> = ranges.iter().map(|r| r.to_string()).collect();
                return Err(format!(
                    "implementation '{}' does not accept API version {} (declares {})",
                    name,
                    api_version,
                    declared.join(", ")
                ));
            }
        }
        Ok(())
    }
}

/// A named extension point: identifier, contract and built-in floor.
#[derive(Clone)]
pub struct PluginCategory {
    id: String,
    contract: CapabilityContract,
    built_ins: Vec<Arc<dyn PluginClass>>,
    description: Option<String>,
}

impl PluginCategory {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contract: CapabilityContract::default(),
            built_ins: Vec::new(),
            description: None,
        }
    }

    pub fn with_contract(mut self, contract: CapabilityContract) -> Self {
        self.contract = contract;
        self
    }

    pub fn with_built_in(mut self, class: Arc<dyn PluginClass>) -> Self {
        self.built_ins.push(class);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build a category from a configuration declaration.
    pub fn from_decl(decl: &CategoryDecl) -> Result<Self, PluginSystemError> {
        let mut contract = CapabilityContract::new();
        for member in &decl.requires {
            contract = contract.require(member.clone());
        }
        if let Some(version) = &decl.api_version {
            contract = contract.with_api_version(parse_version(version)?);
        }
        let mut category = PluginCategory::new(decl.name.trim()).with_contract(contract);
        category.description = decl.description.clone();
        Ok(category)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn contract(&self) -> &CapabilityContract {
        &self.contract
    }

    pub fn built_ins(&self) -> &[Arc<dyn PluginClass>] {
        &self.built_ins
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Validate identifier and built-in set.
    ///
    /// The identifier names the per-category directory under every root, so
    /// it must be a single, non-special path segment.
    pub fn validate(&self) -> Result<(), PluginSystemError> {
        let invalid = |message: String| PluginSystemError::InvalidCategory {
            category: self.id.clone(),
            message,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("identifier is empty".to_string()));
        }
        if self.id.contains(['/', '\\']) || self.id == "." || self.id == ".." {
            return Err(invalid("identifier must be a single path segment".to_string()));
        }

        let mut seen = HashSet::new();
        for class in &self.built_ins {
            self.contract
                .check(class.as_ref())
                .map_err(|reason| invalid(format!("built-in rejected: {}", reason)))?;
            if !seen.insert(class.name().to_string()) {
                return Err(invalid(format!("duplicate built-in '{}'", class.name())));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.built_ins.iter().map(|c| c.name()).collect();
        f.debug_struct("PluginCategory")
            .field("id", &self.id)
            .field("contract", &self.contract)
            .field("built_ins", &names)
            .finish()
    }
}
