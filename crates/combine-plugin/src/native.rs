//! Native plugin support.
//!
//! Plugins run as plain Rust code against the in-memory directive list.

use crate::combine::CombineEntitiesPlugin;
use crate::types::{PluginInput, PluginOutput};

/// Module prefix the plugin may be referenced by in a ledger.
pub const MODULE_PREFIX: &str = "beancount_combine_entities.";

/// Trait for native plugins.
pub trait NativePlugin: Send + Sync {
    /// Plugin name.
    fn name(&self) -> &str;

    /// Process directives and return modified directives + errors.
    fn process(&self, input: PluginInput) -> PluginOutput;
}

/// Registry of built-in native plugins.
pub struct NativePluginRegistry {
    plugins: Vec<Box<dyn NativePlugin>>,
}

impl NativePluginRegistry {
    /// Create a new registry with all built-in plugins.
    pub fn new() -> Self {
        Self {
            plugins: vec![Box::new(CombineEntitiesPlugin)],
        }
    }

    /// Find a plugin by name.
    pub fn find(&self, name: &str) -> Option<&dyn NativePlugin> {
        let name = name.strip_prefix(MODULE_PREFIX).unwrap_or(name);

        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(std::convert::AsRef::as_ref)
    }

    /// Check if a name refers to a built-in plugin.
    pub fn is_builtin(name: &str) -> bool {
        let name = name.strip_prefix(MODULE_PREFIX).unwrap_or(name);
        matches!(name, "combine_entities")
    }

    /// Names of all registered plugins.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name())
    }
}

impl Default for NativePluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_short_and_module_name() {
        let registry = NativePluginRegistry::new();
        assert!(registry.find("combine_entities").is_some());
        assert_eq!(
            registry
                .find("beancount_combine_entities.combine_entities")
                .map(|p| p.name()),
            Some("combine_entities")
        );
        assert!(registry.find("implicit_prices").is_none());
    }

    #[test]
    fn test_is_builtin() {
        assert!(NativePluginRegistry::is_builtin("combine_entities"));
        assert!(NativePluginRegistry::is_builtin(
            "beancount_combine_entities.combine_entities"
        ));
        assert!(!NativePluginRegistry::is_builtin("beancount.plugins.auto"));
    }

    #[test]
    fn test_names() {
        let registry = NativePluginRegistry::default();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["combine_entities"]);
    }
}
