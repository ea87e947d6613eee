//! hydrate - Annotation-driven entity schema and coercion engine
//!
//! This crate derives a structural schema for record classes from their
//! property annotations, caches it in a two-tier (memory + on-disk) cache
//! invalidated by content hash, and uses it to coerce arbitrary untyped
//! input into typed, recursively-constructed entity instances.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ ClassRegistry                                               │
//! │   name -> ClassDef (annotations per class and property)     │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                │ SchemaBuilder
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ SchemaCache (memory tier + persisted SchemaStore)           │
//! │   class -> ClassSchema, keyed by declaration fingerprint    │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                │ CoercionEngine
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ create_from_fields(class, raw map)                          │
//! │   -> Instance with typed, possibly nested field values      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use hydrate_core::{registry, ClassDef, CreateOptions, Value, ValueMap};
//!
//! registry::register(
//!     ClassDef::builder("crate_docs::Address")
//!         .field("street", "string")
//!         .field("city", "string")
//!         .build(),
//! );
//! registry::register(
//!     ClassDef::builder("crate_docs::Order")
//!         .field("reference", "string")
//!         .field("total", "float")
//!         .field("address", "Address")
//!         .build(),
//! );
//!
//! let fields = ValueMap::from([
//!     ("reference", Value::from("ord-1")),
//!     ("total", Value::from("19.95")),
//!     ("address", Value::Map(ValueMap::from([("city", "Utrecht")]))),
//! ]);
//! let order =
//!     hydrate_core::create_from_fields("crate_docs::Order", Some(&fields), &CreateOptions::default())
//!         .expect("construction should succeed");
//!
//! assert_eq!(order.get("total"), Some(&Value::Float(19.95)));
//! let address = order.get("address").and_then(Value::as_entity).expect("nested entity");
//! assert_eq!(address.class_name(), "crate_docs::Address");
//! ```

// Allow the crate to refer to itself as `hydrate_core` for proc macro compatibility
extern crate self as hydrate_core;

pub mod annotations;
pub mod cache;
pub mod coerce;
pub mod config;
pub mod entity;
pub mod registry;
pub mod schema;
pub mod value;

// Re-export commonly used items
pub use annotations::{AnnotationMap, AnnotationValue};
pub use cache::{SchemaCache, SchemaList, SchemaStore};
pub use coerce::CoercionEngine;
pub use config::{CacheConfig, ConfigError, ConfigResult};
pub use entity::{
    annotation_value, create_blank, create_from_fields, global_cache, instance_for_property,
    property_list, property_names, schema, set_fields, CreateOptions, EntityError, FieldOverride,
    Hydrator, Instance,
};
pub use registry::{ClassDef, ClassDefBuilder, ClassRegistry, EntityReflect, PropertyDef};
pub use schema::{
    ClassSchema, FilterFlags, PropertyFilter, PropertySchema, SchemaBuilder, SchemaError,
    TypeDescriptor, BASIC_TYPES,
};
pub use value::{Value, ValueMap};

// Re-export the derive macro
pub use hydrate_macros::Entity;
