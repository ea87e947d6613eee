//! Per-property schema

use crate::annotations::AnnotationMap;
use crate::registry::ClassRegistry;
use crate::schema::types::TypeDescriptor;

/// Schema for one declared property
///
/// `types` holds one descriptor per declared alternative, in declaration
/// order. More than one entry means a declared union; the order must be
/// preserved because disambiguation ties resolve to the earliest entry.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySchema {
    name: String,
    types: Vec<TypeDescriptor>,
    annotations: AnnotationMap,
    is_static: bool,
}

impl PropertySchema {
    pub(crate) fn new(
        name: String,
        types: Vec<TypeDescriptor>,
        annotations: AnnotationMap,
        is_static: bool,
    ) -> Self {
        Self {
            name,
            types,
            annotations,
            is_static,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type alternatives in declaration order
    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    /// First declared type alternative
    pub fn first_type(&self) -> Option<&TypeDescriptor> {
        self.types.first()
    }

    /// Descriptor whose resolved name matches, if any
    pub fn type_by_resolved(&self, resolved: &str) -> Option<&TypeDescriptor> {
        self.types.iter().find(|ty| ty.resolved() == resolved)
    }

    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    /// First value of an annotation key
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.first(key)
    }

    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotations.contains(key)
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Alternatives that resolve to loadable classes
    pub fn class_types(&self, registry: &ClassRegistry) -> Vec<&TypeDescriptor> {
        self.types.iter().filter(|ty| ty.is_class(registry)).collect()
    }

    pub fn has_class_type(&self, registry: &ClassRegistry) -> bool {
        self.types.iter().any(|ty| ty.is_class(registry))
    }

    /// Alternatives that resolve to registered entity classes
    pub fn entity_types(&self, registry: &ClassRegistry) -> Vec<&TypeDescriptor> {
        self.types.iter().filter(|ty| ty.is_entity(registry)).collect()
    }

    pub fn has_entity_type(&self, registry: &ClassRegistry) -> bool {
        self.types.iter().any(|ty| ty.is_entity(registry))
    }

    /// Exactly one declared type, and it is an entity class
    pub fn has_single_entity_type(&self, registry: &ClassRegistry) -> bool {
        self.types.len() == 1 && self.entity_types(registry).len() == 1
    }

    /// More than one declared entity class alternative
    pub fn has_union_entity_type(&self, registry: &ClassRegistry) -> bool {
        self.entity_types(registry).len() > 1
    }
}
