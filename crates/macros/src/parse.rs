//! Attribute parsing for the Entity derive macro

use darling::{FromDeriveInput, FromField, FromMeta};
use syn::{DeriveInput, Ident, Type};

/// One key/value annotation given as `annotation(key = "...", value = "...")`
#[derive(Debug, FromMeta)]
pub struct AnnotationArg {
    pub key: String,
    pub value: String,
}

/// Parsed #[entity(...)] attributes on the struct
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(entity), supports(struct_named))]
pub struct EntityClassArgs {
    /// Struct identifier
    pub ident: Ident,

    /// Struct fields
    pub data: darling::ast::Data<(), EntityFieldArgs>,

    /// Registered class name (defaults to the struct identifier)
    #[darling(default, rename = "class")]
    pub class_name: Option<String>,

    /// Whether instances participate in recursive construction
    #[darling(default = "default_entity_flag")]
    pub entity: bool,

    /// Class-level annotations
    #[darling(multiple, rename = "annotation")]
    pub annotations: Vec<AnnotationArg>,
}

fn default_entity_flag() -> bool {
    true
}

/// Parsed #[entity(...)] attributes on a field
#[derive(Debug, FromField)]
#[darling(attributes(entity))]
pub struct EntityFieldArgs {
    /// Field identifier
    pub ident: Option<Ident>,

    /// Field type
    pub ty: Type,

    /// Type declaration override (e.g. "string|Address"), without the
    /// trailing field identifier
    #[darling(default)]
    pub var: Option<String>,

    /// Timestamp rendering format annotation
    #[darling(default)]
    pub format: Option<String>,

    /// Extra annotations
    #[darling(multiple, rename = "annotation")]
    pub annotations: Vec<AnnotationArg>,

    /// Leave this field out of the class declaration
    #[darling(default)]
    pub skip: bool,
}

/// Parse a DeriveInput into EntityClassArgs
pub fn parse_entity_class(input: &DeriveInput) -> darling::Result<EntityClassArgs> {
    EntityClassArgs::from_derive_input(input)
}
