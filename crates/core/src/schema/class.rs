//! Class schema and filtered property enumeration

use bitflags::bitflags;

use crate::annotations::AnnotationMap;
use crate::registry::ClassRegistry;
use crate::schema::property::PropertySchema;
use crate::schema::types::BASIC_TYPES;

bitflags! {
    /// Flags that restrict property enumeration
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FilterFlags: u32 {
        /// Skip properties with at least one class-typed alternative
        const SKIP_CLASS_TYPED = 0x01;
        /// Skip properties with at least one entity-typed alternative
        const SKIP_ENTITY_TYPED = 0x02;
        /// Keep only properties whose first type is a builtin scalar
        const BUILTIN_ONLY = 0x04;
    }
}

/// Property enumeration filter
///
/// Static properties are always excluded; the flags and exclusion lists
/// narrow the remainder.
#[derive(Debug, Clone)]
pub struct PropertyFilter {
    pub flags: FilterFlags,
    pub exclude_names: Vec<String>,
    pub exclude_annotation_keys: Vec<String>,
}

impl Default for PropertyFilter {
    fn default() -> Self {
        Self {
            flags: FilterFlags::empty(),
            exclude_names: Vec::new(),
            exclude_annotation_keys: Vec::new(),
        }
    }
}

impl PropertyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(flags: FilterFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    /// Exclude a property by name
    pub fn exclude_name(mut self, name: impl Into<String>) -> Self {
        self.exclude_names.push(name.into());
        self
    }

    /// Exclude properties carrying an annotation key
    pub fn exclude_annotation_key(mut self, key: impl Into<String>) -> Self {
        self.exclude_annotation_keys.push(key.into());
        self
    }

    fn keeps(&self, registry: &ClassRegistry, property: &PropertySchema) -> bool {
        if property.is_static() {
            return false;
        }
        if self.flags.contains(FilterFlags::SKIP_CLASS_TYPED) && property.has_class_type(registry) {
            return false;
        }
        if self.flags.contains(FilterFlags::SKIP_ENTITY_TYPED) && property.has_entity_type(registry)
        {
            return false;
        }
        if self.flags.contains(FilterFlags::BUILTIN_ONLY) {
            let scalar = property
                .first_type()
                .map(|ty| BASIC_TYPES.contains(&ty.resolved()))
                .unwrap_or(false);
            if !scalar {
                return false;
            }
        }
        if self.exclude_names.iter().any(|name| name == property.name()) {
            return false;
        }
        if self
            .exclude_annotation_keys
            .iter()
            .any(|key| property.has_annotation(key))
        {
            return false;
        }
        true
    }
}

/// Derived schema for one class
///
/// Built once per `(class, fingerprint)` by the schema builder, owned by the
/// cache afterwards; consumers only ever see shared read-only views.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassSchema {
    class_name: String,
    fingerprint: u64,
    annotations: AnnotationMap,
    properties: Vec<PropertySchema>,
}

impl ClassSchema {
    pub(crate) fn new(
        class_name: String,
        fingerprint: u64,
        annotations: AnnotationMap,
        properties: Vec<PropertySchema>,
    ) -> Self {
        Self {
            class_name,
            fingerprint,
            annotations,
            properties,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Content hash of the declaration this schema was derived from
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    /// First value of a class-level annotation key
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.first(key)
    }

    /// Property schemas in declaration order
    pub fn properties(&self) -> &[PropertySchema] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|property| property.name() == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Property names in declaration order
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(PropertySchema::name).collect()
    }

    /// Non-static properties passing the filter, in declaration order
    pub fn filtered(
        &self,
        registry: &ClassRegistry,
        filter: &PropertyFilter,
    ) -> Vec<&PropertySchema> {
        self.properties
            .iter()
            .filter(|property| filter.keeps(registry, property))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ClassDef;
    use crate::schema::builder::SchemaBuilder;

    fn sample_schema(registry: &ClassRegistry) -> ClassSchema {
        registry.register(ClassDef::builder("filt::Address").field("city", "string").build());
        registry.register(
            ClassDef::builder("filt::Order")
                .field("reference", "string")
                .field("total", "float")
                .field("address", "Address")
                .field("created_at", "DateTime")
                .field("payload", "mixed")
                .property(
                    "legacy",
                    crate::annotations::AnnotationMap::from([
                        ("var", "string $legacy"),
                        ("deprecated", "use reference"),
                    ]),
                )
                .static_property(
                    "instances",
                    crate::annotations::AnnotationMap::from([("var", "int $instances")]),
                )
                .build(),
        );
        SchemaBuilder::new(registry)
            .build("filt::Order")
            .expect("schema should build")
    }

    fn names(properties: &[&PropertySchema]) -> Vec<String> {
        properties.iter().map(|p| p.name().to_string()).collect()
    }

    #[test]
    fn test_unfiltered_excludes_static() {
        let registry = ClassRegistry::new();
        let schema = sample_schema(&registry);

        let listed = schema.filtered(&registry, &PropertyFilter::new());
        assert_eq!(
            names(&listed),
            vec!["reference", "total", "address", "created_at", "payload", "legacy"]
        );
    }

    #[test]
    fn test_skip_class_typed() {
        let registry = ClassRegistry::new();
        let schema = sample_schema(&registry);

        let listed = schema.filtered(
            &registry,
            &PropertyFilter::with_flags(FilterFlags::SKIP_CLASS_TYPED),
        );
        // Both the entity-typed and the DateTime-typed properties drop out
        assert_eq!(names(&listed), vec!["reference", "total", "payload", "legacy"]);
    }

    #[test]
    fn test_skip_entity_typed_keeps_datetime() {
        let registry = ClassRegistry::new();
        let schema = sample_schema(&registry);

        let listed = schema.filtered(
            &registry,
            &PropertyFilter::with_flags(FilterFlags::SKIP_ENTITY_TYPED),
        );
        // DateTime is a class type but not an entity type
        assert_eq!(
            names(&listed),
            vec!["reference", "total", "created_at", "payload", "legacy"]
        );
    }

    #[test]
    fn test_builtin_only() {
        let registry = ClassRegistry::new();
        let schema = sample_schema(&registry);

        let listed = schema.filtered(
            &registry,
            &PropertyFilter::with_flags(FilterFlags::BUILTIN_ONLY),
        );
        // mixed is not a basic scalar
        assert_eq!(names(&listed), vec!["reference", "total", "legacy"]);
    }

    #[test]
    fn test_exclusion_lists() {
        let registry = ClassRegistry::new();
        let schema = sample_schema(&registry);

        let listed = schema.filtered(
            &registry,
            &PropertyFilter::new()
                .exclude_name("total")
                .exclude_annotation_key("deprecated"),
        );
        assert_eq!(names(&listed), vec!["reference", "address", "created_at", "payload"]);
    }
}
