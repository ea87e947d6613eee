//! Entity construction front door
//!
//! Construction takes a class name and a map of raw field values, looks up
//! the class's schema through the cache and runs every field through the
//! coercion engine:
//!
//! ```
//! use hydrate_core::{registry, ClassDef, CreateOptions, Value, ValueMap};
//!
//! registry::register(
//!     ClassDef::builder("docs::Order")
//!         .field("reference", "string")
//!         .field("total", "float")
//!         .build(),
//! );
//!
//! let fields = ValueMap::from([("reference", "ord-1"), ("total", "9.50")]);
//! let order = hydrate_core::create_from_fields("docs::Order", Some(&fields), &CreateOptions::default())
//!     .expect("construction should succeed");
//! assert_eq!(order.get("total"), Some(&Value::Float(9.5)));
//! ```
//!
//! The free functions operate on the process-wide registry and cache; a
//! [`Hydrator`] bundles explicitly-scoped collaborators for tests and
//! embedders.

mod instance;

pub use instance::Instance;

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use tracing::trace;

use crate::annotations::AnnotationValue;
use crate::cache::SchemaCache;
use crate::coerce::CoercionEngine;
use crate::config::CacheConfig;
use crate::registry::{self, ClassRegistry};
use crate::schema::{ClassSchema, PropertyFilter, PropertySchema, SchemaError};
use crate::value::{Value, ValueMap};

/// Error type for entity construction
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// Schema derivation failed for the target class
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// An input field has no declared property while unknown fields are
    /// being rejected
    #[error("Unknown field '{field}' for class '{class}'")]
    UnknownField { class: String, field: String },

    /// A property was expected to declare a class type but does not
    #[error("Property '{class}::{property}' does not declare a class type")]
    NoClassType { class: String, property: String },
}

/// Callback override, invoked with the field name
pub type OverrideFn = Arc<dyn Fn(&str) -> Value + Send + Sync>;

/// Per-field construction override
///
/// Overrides are consulted only when unknown fields are being rejected
/// (`force_unknown_fields`), where they exempt specific fields from the
/// schema lookup.
#[derive(Clone)]
pub enum FieldOverride {
    /// Coerce the incoming value with this schema instead of the declared one
    Schema(PropertySchema),
    /// Invoke with the field name and assign the result
    With(OverrideFn),
    /// Assign this value verbatim
    Value(Value),
}

impl FieldOverride {
    /// Convenience constructor for callback overrides
    pub fn call<F>(callback: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        Self::With(Arc::new(callback))
    }
}

impl std::fmt::Debug for FieldOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(schema) => f.debug_tuple("Schema").field(&schema.name()).finish(),
            Self::With(_) => f.write_str("With(..)"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Options controlling construction
#[derive(Clone, Debug)]
pub struct CreateOptions {
    /// Reject input fields that have no declared property (overrides exempt)
    pub force_unknown_fields: bool,

    /// Per-field overrides, consulted only when unknown fields are rejected
    pub overrides: HashMap<String, FieldOverride>,

    /// Construct nested entities from raw maps (on by default)
    pub cast_entities: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            force_unknown_fields: false,
            overrides: HashMap::new(),
            cast_entities: true,
        }
    }
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force_unknown_fields(mut self, force: bool) -> Self {
        self.force_unknown_fields = force;
        self
    }

    pub fn cast_entities(mut self, cast: bool) -> Self {
        self.cast_entities = cast;
        self
    }

    /// Add a per-field override
    pub fn override_field(mut self, field: impl Into<String>, value: FieldOverride) -> Self {
        self.overrides.insert(field.into(), value);
        self
    }
}

/// Bundles a registry and schema cache behind one construction API
pub struct Hydrator<'a> {
    registry: &'a ClassRegistry,
    cache: &'a SchemaCache,
}

impl<'a> Hydrator<'a> {
    pub fn new(registry: &'a ClassRegistry, cache: &'a SchemaCache) -> Self {
        Self { registry, cache }
    }

    /// Schema lookup through the cache
    pub fn schema(&self, class_name: &str) -> Result<Arc<ClassSchema>, SchemaError> {
        self.cache.get(self.registry, class_name)
    }

    /// Build one instance from raw field values
    pub fn create_from_fields(
        &self,
        class_name: &str,
        fields: Option<&ValueMap>,
        options: &CreateOptions,
    ) -> Result<Instance, EntityError> {
        build(self.registry, self.cache, class_name, fields, options)
    }

    /// Populate (or update) an existing instance from raw field values
    pub fn set_fields(
        &self,
        instance: &mut Instance,
        fields: &ValueMap,
        options: &CreateOptions,
    ) -> Result<(), EntityError> {
        apply_fields(self.registry, self.cache, instance, fields, options)
    }

    /// Blank instance of a class, no construction side effects
    pub fn create_blank(&self, class_name: &str) -> Result<Instance, EntityError> {
        // The schema lookup validates the class and warms the cache
        let schema = self.schema(class_name)?;
        Ok(Instance::blank(schema.class_name()))
    }

    /// Blank instance of the class type declared by a property
    pub fn instance_for_property(
        &self,
        class_name: &str,
        property: &str,
    ) -> Result<Instance, EntityError> {
        let schema = self.schema(class_name)?;
        let Some(property_schema) = schema.property(property) else {
            return Err(EntityError::UnknownField {
                class: class_name.to_string(),
                field: property.to_string(),
            });
        };
        let class_types = property_schema.class_types(self.registry);
        let Some(first) = class_types.first() else {
            return Err(EntityError::NoClassType {
                class: class_name.to_string(),
                property: property.to_string(),
            });
        };
        Ok(Instance::blank(first.resolved()))
    }

    /// Annotation lookup through the schema
    pub fn annotation_value(
        &self,
        class_name: &str,
        property: &str,
        key: &str,
    ) -> Result<Option<AnnotationValue>, EntityError> {
        let schema = self.schema(class_name)?;
        Ok(schema
            .property(property)
            .and_then(|property| property.annotations().get(key))
            .cloned())
    }

    /// Filtered property enumeration
    pub fn property_list(
        &self,
        class_name: &str,
        filter: &PropertyFilter,
    ) -> Result<Vec<PropertySchema>, EntityError> {
        let schema = self.schema(class_name)?;
        Ok(schema
            .filtered(self.registry, filter)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Filtered property names
    pub fn property_names(
        &self,
        class_name: &str,
        filter: &PropertyFilter,
    ) -> Result<Vec<String>, EntityError> {
        Ok(self
            .property_list(class_name, filter)?
            .into_iter()
            .map(|property| property.name().to_string())
            .collect())
    }
}

/// Construction with explicit collaborators
pub(crate) fn build(
    registry: &ClassRegistry,
    cache: &SchemaCache,
    class_name: &str,
    fields: Option<&ValueMap>,
    options: &CreateOptions,
) -> Result<Instance, EntityError> {
    let mut instance = Instance::blank(class_name);
    if let Some(fields) = fields {
        apply_fields(registry, cache, &mut instance, fields, options)?;
    }
    Ok(instance)
}

/// Populate an instance from raw field values
pub(crate) fn apply_fields(
    registry: &ClassRegistry,
    cache: &SchemaCache,
    instance: &mut Instance,
    fields: &ValueMap,
    options: &CreateOptions,
) -> Result<(), EntityError> {
    let schema = cache.get(registry, instance.class_name())?;
    let engine = CoercionEngine::new(registry, cache);

    for (field, value) in fields.entries() {
        // Overrides exempt a field from the schema lookup
        if options.force_unknown_fields {
            if let Some(field_override) = options.overrides.get(field) {
                let resolved = apply_override(&engine, field_override, field, value.clone())?;
                instance.set(field.clone(), resolved);
                continue;
            }
        }

        // An object already held at the field only accepts an in-place merge
        if let Some(existing) = instance.get_mut(field) {
            if existing.is_object() {
                if options.cast_entities {
                    if let (Value::Entity(nested), Value::Map(incoming)) = (existing, value) {
                        let nested_options = CreateOptions {
                            force_unknown_fields: options.force_unknown_fields,
                            cast_entities: options.cast_entities,
                            overrides: HashMap::new(),
                        };
                        apply_fields(registry, cache, nested, incoming, &nested_options)?;
                    }
                }
                continue;
            }
        }

        match schema.property(field) {
            Some(property) => {
                let coerced = engine.coerce(
                    property,
                    value.clone(),
                    options.force_unknown_fields,
                    options.cast_entities,
                )?;
                instance.set(field.clone(), coerced);
            }
            None if options.force_unknown_fields => {
                return Err(EntityError::UnknownField {
                    class: instance.class_name().to_string(),
                    field: field.clone(),
                });
            }
            None => {
                trace!(
                    "Assigning undeclared field '{}' verbatim on '{}'",
                    field,
                    instance.class_name()
                );
                instance.set(field.clone(), value.clone());
            }
        }
    }
    Ok(())
}

fn apply_override(
    engine: &CoercionEngine,
    field_override: &FieldOverride,
    field: &str,
    value: Value,
) -> Result<Value, EntityError> {
    match field_override {
        FieldOverride::Schema(schema) => engine.coerce(schema, value, false, true),
        FieldOverride::With(callback) => Ok(callback(field)),
        FieldOverride::Value(fixed) => Ok(fixed.clone()),
    }
}

/// Process-wide schema cache backing the free-function API
static GLOBAL_CACHE: LazyLock<SchemaCache> =
    LazyLock::new(|| SchemaCache::from_config(&CacheConfig::default()));

/// The process-wide schema cache
pub fn global_cache() -> &'static SchemaCache {
    &GLOBAL_CACHE
}

fn default_hydrator() -> Hydrator<'static> {
    Hydrator::new(registry::global(), &GLOBAL_CACHE)
}

/// [`Hydrator::schema`] on the process-wide collaborators
pub fn schema(class_name: &str) -> Result<Arc<ClassSchema>, SchemaError> {
    default_hydrator().schema(class_name)
}

/// [`Hydrator::create_from_fields`] on the process-wide collaborators
pub fn create_from_fields(
    class_name: &str,
    fields: Option<&ValueMap>,
    options: &CreateOptions,
) -> Result<Instance, EntityError> {
    default_hydrator().create_from_fields(class_name, fields, options)
}

/// [`Hydrator::set_fields`] on the process-wide collaborators
pub fn set_fields(
    instance: &mut Instance,
    fields: &ValueMap,
    options: &CreateOptions,
) -> Result<(), EntityError> {
    default_hydrator().set_fields(instance, fields, options)
}

/// [`Hydrator::create_blank`] on the process-wide collaborators
pub fn create_blank(class_name: &str) -> Result<Instance, EntityError> {
    default_hydrator().create_blank(class_name)
}

/// [`Hydrator::instance_for_property`] on the process-wide collaborators
pub fn instance_for_property(class_name: &str, property: &str) -> Result<Instance, EntityError> {
    default_hydrator().instance_for_property(class_name, property)
}

/// [`Hydrator::annotation_value`] on the process-wide collaborators
pub fn annotation_value(
    class_name: &str,
    property: &str,
    key: &str,
) -> Result<Option<AnnotationValue>, EntityError> {
    default_hydrator().annotation_value(class_name, property, key)
}

/// [`Hydrator::property_list`] on the process-wide collaborators
pub fn property_list(
    class_name: &str,
    filter: &PropertyFilter,
) -> Result<Vec<PropertySchema>, EntityError> {
    default_hydrator().property_list(class_name, filter)
}

/// [`Hydrator::property_names`] on the process-wide collaborators
pub fn property_names(class_name: &str, filter: &PropertyFilter) -> Result<Vec<String>, EntityError> {
    default_hydrator().property_names(class_name, filter)
}
