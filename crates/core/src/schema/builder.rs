//! Schema derivation from class declarations
//!
//! The builder reads each property's `var` annotation, resolves the declared
//! tokens into [`TypeDescriptor`]s and assembles a [`ClassSchema`]. Tokens
//! resolve against the declaring class's namespace before they are tried
//! literally, mirroring how class references are usually written relative to
//! their surroundings.

use tracing::debug;

use crate::registry::{ClassDef, ClassRegistry, PropertyDef};
use crate::schema::class::ClassSchema;
use crate::schema::property::PropertySchema;
use crate::schema::types::{is_builtin_name, TypeDescriptor};

/// Error type for schema derivation
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// No declaration registered under the requested name
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    /// A declared token has no builtin or loadable-class meaning and the
    /// union declares no `mixed` fallback
    #[error("Could not resolve type '{token}' for property '{class}::{property}'")]
    UnresolvedType {
        class: String,
        property: String,
        token: String,
    },
}

/// Derives [`ClassSchema`] values from registered class declarations
pub struct SchemaBuilder<'a> {
    registry: &'a ClassRegistry,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(registry: &'a ClassRegistry) -> Self {
        Self { registry }
    }

    /// Build the schema for a registered class
    pub fn build(&self, class_name: &str) -> Result<ClassSchema, SchemaError> {
        let def = self
            .registry
            .get(class_name)
            .ok_or_else(|| SchemaError::UnknownClass(class_name.to_string()))?;
        self.build_def(&def)
    }

    /// Build a schema straight from a declaration
    pub fn build_def(&self, def: &ClassDef) -> Result<ClassSchema, SchemaError> {
        let mut properties = Vec::with_capacity(def.properties().len());
        for property in def.properties() {
            properties.push(self.build_property(def, property)?);
        }
        debug!(
            "Built schema for '{}' ({} properties)",
            def.class_name(),
            properties.len()
        );
        Ok(ClassSchema::new(
            def.class_name().to_string(),
            def.fingerprint(),
            def.annotations().clone(),
            properties,
        ))
    }

    fn build_property(
        &self,
        def: &ClassDef,
        property: &PropertyDef,
    ) -> Result<PropertySchema, SchemaError> {
        let types = match property.annotations().first("var") {
            Some(declaration) => self.parse_declaration(def, property.name(), declaration)?,
            // No type declaration: the property accepts anything
            None => vec![TypeDescriptor::new("mixed", "mixed")],
        };
        Ok(PropertySchema::new(
            property.name().to_string(),
            types,
            property.annotations().clone(),
            property.is_static(),
        ))
    }

    /// Parse a `var` declaration: the first whitespace-separated segment is
    /// the type expression, pipe-separated for unions
    fn parse_declaration(
        &self,
        def: &ClassDef,
        property_name: &str,
        declaration: &str,
    ) -> Result<Vec<TypeDescriptor>, SchemaError> {
        let Some(segment) = declaration.split_whitespace().next() else {
            return Ok(vec![TypeDescriptor::new("mixed", "mixed")]);
        };

        let tokens: Vec<&str> = segment.split('|').collect();
        let has_mixed = tokens.contains(&"mixed");

        let mut descriptors = Vec::with_capacity(tokens.len());
        for raw in &tokens {
            // A declaration written as `$name` without a type only echoes
            // the identifier
            let token = raw.strip_prefix('$').unwrap_or(raw);
            if token == property_name {
                descriptors.push(TypeDescriptor::new("mixed", "mixed"));
                continue;
            }

            match self.resolve_token(def, token) {
                Some(resolved) => descriptors.push(TypeDescriptor::new(token, resolved)),
                None if has_mixed => descriptors.push(TypeDescriptor::new(token, "mixed")),
                None => {
                    return Err(SchemaError::UnresolvedType {
                        class: def.class_name().to_string(),
                        property: property_name.to_string(),
                        token: token.to_string(),
                    })
                }
            }
        }
        Ok(descriptors)
    }

    /// Map one declared token to a builtin name or a loadable class name
    ///
    /// Resolution order: builtin set, declaring namespace scope (for
    /// unqualified tokens), literal registry lookup, the date/time class.
    fn resolve_token(&self, def: &ClassDef, token: &str) -> Option<String> {
        let base = token.strip_suffix("[]").unwrap_or(token);
        if base.is_empty() {
            return None;
        }
        if is_builtin_name(base) {
            return Some(base.to_string());
        }

        let namespace = def.namespace();
        if !namespace.is_empty() && !base.contains("::") {
            let scoped = format!("{namespace}::{base}");
            if self.registry.contains(&scoped) {
                return Some(scoped);
            }
        }
        if self.registry.contains(base) || base == "DateTime" {
            return Some(base.to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::AnnotationMap;
    use crate::registry::ClassDef;

    fn registry_with_address() -> ClassRegistry {
        let registry = ClassRegistry::new();
        registry.register(ClassDef::builder("shop::Address").field("city", "string").build());
        registry
    }

    #[test]
    fn test_builtin_resolution() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDef::builder("build::Plain")
                .field("name", "string")
                .field("count", "int")
                .field("ratio", "float")
                .field("exact", "double")
                .field("open", "bool")
                .field("tags", "array")
                .field("anything", "mixed")
                .build(),
        );

        let schema = SchemaBuilder::new(&registry).build("build::Plain").expect("schema");
        let resolved: Vec<&str> = schema
            .properties()
            .iter()
            .map(|p| p.first_type().expect("type").resolved())
            .collect();
        assert_eq!(
            resolved,
            vec!["string", "int", "float", "double", "bool", "array", "mixed"]
        );
    }

    #[test]
    fn test_namespace_scoped_resolution_wins() {
        let registry = registry_with_address();
        // A literal class under the same bare name should lose to the
        // namespace-scoped candidate
        registry.register(ClassDef::builder("Address").field("planet", "string").build());
        registry.register(ClassDef::builder("shop::Order").field("address", "Address").build());

        let schema = SchemaBuilder::new(&registry).build("shop::Order").expect("schema");
        let descriptor = schema.property("address").and_then(|p| p.first_type()).expect("type");
        assert_eq!(descriptor.resolved(), "shop::Address");
        assert_eq!(descriptor.declared(), "Address");
    }

    #[test]
    fn test_literal_resolution_fallback() {
        let registry = ClassRegistry::new();
        registry.register(ClassDef::builder("crm::Contact").field("name", "string").build());
        registry.register(ClassDef::builder("shop::Order").field("contact", "crm::Contact").build());

        let schema = SchemaBuilder::new(&registry).build("shop::Order").expect("schema");
        let descriptor = schema.property("contact").and_then(|p| p.first_type()).expect("type");
        assert_eq!(descriptor.resolved(), "crm::Contact");
    }

    #[test]
    fn test_union_declaration_order() {
        let registry = registry_with_address();
        registry.register(
            ClassDef::builder("shop::Order")
                .field("destination", "Address|string")
                .build(),
        );

        let schema = SchemaBuilder::new(&registry).build("shop::Order").expect("schema");
        let property = schema.property("destination").expect("property");
        let resolved: Vec<&str> = property.types().iter().map(TypeDescriptor::resolved).collect();
        assert_eq!(resolved, vec!["shop::Address", "string"]);
    }

    #[test]
    fn test_array_marker_kept_on_declared_token() {
        let registry = registry_with_address();
        registry.register(ClassDef::builder("shop::Order").field("addresses", "Address[]").build());

        let schema = SchemaBuilder::new(&registry).build("shop::Order").expect("schema");
        let descriptor = schema.property("addresses").and_then(|p| p.first_type()).expect("type");
        assert_eq!(descriptor.declared(), "Address[]");
        assert_eq!(descriptor.resolved(), "shop::Address");
        assert!(descriptor.is_array());
    }

    #[test]
    fn test_identifier_echo_becomes_mixed() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDef::builder("build::Loose")
                .property("payload", AnnotationMap::from([("var", "$payload")]))
                .build(),
        );

        let schema = SchemaBuilder::new(&registry).build("build::Loose").expect("schema");
        let descriptor = schema.property("payload").and_then(|p| p.first_type()).expect("type");
        assert!(descriptor.is_mixed());
    }

    #[test]
    fn test_missing_var_defaults_to_mixed() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDef::builder("build::Bare")
                .property("anything", AnnotationMap::from([("label", "free-form")]))
                .build(),
        );

        let schema = SchemaBuilder::new(&registry).build("build::Bare").expect("schema");
        let property = schema.property("anything").expect("property");
        assert_eq!(property.types().len(), 1);
        assert!(property.first_type().expect("type").is_mixed());
    }

    #[test]
    fn test_datetime_resolves_without_registration() {
        let registry = ClassRegistry::new();
        registry.register(ClassDef::builder("build::Event").field("starts_at", "DateTime").build());

        let schema = SchemaBuilder::new(&registry).build("build::Event").expect("schema");
        let descriptor = schema.property("starts_at").and_then(|p| p.first_type()).expect("type");
        assert_eq!(descriptor.resolved(), "DateTime");
        assert!(descriptor.is_datetime());
    }

    #[test]
    fn test_unresolved_token_errors_with_class_and_property() {
        let registry = ClassRegistry::new();
        registry.register(ClassDef::builder("build::Broken").field("mystery", "NoSuchClass").build());

        let error = SchemaBuilder::new(&registry)
            .build("build::Broken")
            .expect_err("build should fail");
        match error {
            SchemaError::UnresolvedType {
                class,
                property,
                token,
            } => {
                assert_eq!(class, "build::Broken");
                assert_eq!(property, "mystery");
                assert_eq!(token, "NoSuchClass");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mixed_fallback_swallows_unresolved_tokens() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDef::builder("build::Tolerant")
                .field("mystery", "NoSuchClass|mixed")
                .build(),
        );

        let schema = SchemaBuilder::new(&registry).build("build::Tolerant").expect("schema");
        let property = schema.property("mystery").expect("property");
        let resolved: Vec<&str> = property.types().iter().map(TypeDescriptor::resolved).collect();
        assert_eq!(resolved, vec!["mixed", "mixed"]);
    }

    #[test]
    fn test_unknown_class_errors() {
        let registry = ClassRegistry::new();
        let error = SchemaBuilder::new(&registry)
            .build("build::Ghost")
            .expect_err("build should fail");
        assert!(matches!(error, SchemaError::UnknownClass(name) if name == "build::Ghost"));
    }

    #[test]
    fn test_class_annotations_copied() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDef::builder("build::Labeled")
                .annotation("label", "Labeled thing")
                .annotation("see", "build::Other")
                .annotation("see", "build::Another")
                .field("name", "string")
                .build(),
        );

        let schema = SchemaBuilder::new(&registry).build("build::Labeled").expect("schema");
        assert_eq!(schema.annotation("label"), Some("Labeled thing"));
        let see = schema.annotations().get("see").expect("see annotation");
        assert_eq!(see.all(), vec!["build::Other", "build::Another"]);
    }
}
