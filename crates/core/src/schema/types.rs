//! Resolved type descriptors

use serde::{Deserialize, Serialize};

use crate::registry::ClassRegistry;

/// Builtin scalar type names
pub const BASIC_TYPES: [&str; 5] = ["string", "bool", "int", "float", "double"];

/// Whether a resolved name is part of the builtin set, including the
/// pseudo-types `array`, `mixed` and `object`
pub(crate) fn is_builtin_name(name: &str) -> bool {
    BASIC_TYPES.contains(&name) || matches!(name, "array" | "mixed" | "object")
}

/// Whether a resolved name denotes a date/time class
pub(crate) fn is_datetime_name(name: &str) -> bool {
    name.contains("DateTime")
}

/// One resolved type alternative for a property
///
/// `declared` is the token as written (array marker included), `resolved`
/// is a builtin name or a loadable class name. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    declared: String,
    resolved: String,
}

impl TypeDescriptor {
    pub fn new(declared: impl Into<String>, resolved: impl Into<String>) -> Self {
        Self {
            declared: declared.into(),
            resolved: resolved.into(),
        }
    }

    /// Token as declared, e.g. `Address[]`
    pub fn declared(&self) -> &str {
        &self.declared
    }

    /// Resolved name, e.g. `shop::Address` or `string`
    pub fn resolved(&self) -> &str {
        &self.resolved
    }

    /// Whether the declaration denotes a collection
    pub fn is_array(&self) -> bool {
        self.declared.ends_with("[]") || self.resolved == "array"
    }

    pub fn is_builtin(&self) -> bool {
        is_builtin_name(&self.resolved)
    }

    pub fn is_mixed(&self) -> bool {
        self.resolved == "mixed"
    }

    /// Whether the resolved name denotes a date/time class
    pub fn is_datetime(&self) -> bool {
        is_datetime_name(&self.resolved)
    }

    /// Whether the resolved name denotes a loadable class
    ///
    /// Checked against the registry at call time: persisted schemas may be
    /// revived before the classes they reference are registered.
    pub fn is_class(&self, registry: &ClassRegistry) -> bool {
        self.is_datetime() || registry.contains(&self.resolved)
    }

    /// Whether the resolved name denotes a registered entity class
    pub fn is_entity(&self, registry: &ClassRegistry) -> bool {
        registry
            .get(&self.resolved)
            .map(|def| def.is_entity())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ClassDef;

    #[test]
    fn test_array_detection() {
        assert!(TypeDescriptor::new("Address[]", "shop::Address").is_array());
        assert!(TypeDescriptor::new("string[]", "string").is_array());
        // An untyped array is an array even without the marker
        assert!(TypeDescriptor::new("array", "array").is_array());
        assert!(!TypeDescriptor::new("Address", "shop::Address").is_array());
    }

    #[test]
    fn test_builtin_and_mixed() {
        assert!(TypeDescriptor::new("string", "string").is_builtin());
        assert!(TypeDescriptor::new("object", "object").is_builtin());
        assert!(TypeDescriptor::new("mixed", "mixed").is_mixed());
        assert!(!TypeDescriptor::new("Address", "shop::Address").is_builtin());
    }

    #[test]
    fn test_class_checks_are_lazy() {
        let registry = ClassRegistry::new();
        let descriptor = TypeDescriptor::new("Address", "shop::Address");

        // Not a class until the registry knows the name
        assert!(!descriptor.is_class(&registry));
        registry.register(ClassDef::builder("shop::Address").field("city", "string").build());
        assert!(descriptor.is_class(&registry));
        assert!(descriptor.is_entity(&registry));
    }

    #[test]
    fn test_datetime_is_class_without_registration() {
        let registry = ClassRegistry::new();
        let descriptor = TypeDescriptor::new("DateTime", "DateTime");
        assert!(descriptor.is_class(&registry));
        assert!(descriptor.is_datetime());
        // But never an entity
        assert!(!descriptor.is_entity(&registry));
    }

    #[test]
    fn test_non_entity_class() {
        let registry = ClassRegistry::new();
        registry.register(ClassDef::builder("shop::Money").field("amount", "int").entity(false).build());

        let descriptor = TypeDescriptor::new("Money", "shop::Money");
        assert!(descriptor.is_class(&registry));
        assert!(!descriptor.is_entity(&registry));
    }
}
