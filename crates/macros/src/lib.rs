//! hydrate proc macros
//!
//! This crate provides the `#[derive(Entity)]` macro: a compile-time
//! provider of class declarations for the hydrate engine. The derive turns a
//! struct definition into an `EntityReflect` implementation whose
//! `class_def()` carries one annotation map per field, ready for schema
//! derivation.
//!
//! # Example
//!
//! ```ignore
//! use hydrate_core::Entity;
//!
//! #[derive(Entity)]
//! #[entity(class = "shop::Order")]
//! pub struct Order {
//!     reference: String,
//!
//!     // Declared type inferred from the Rust type: "float $total"
//!     total: f64,
//!
//!     // Explicit union declaration
//!     #[entity(var = "Address|string")]
//!     destination: String,
//!
//!     #[entity(format = "ISO8601")]
//!     created_at: chrono::DateTime<chrono::Utc>,
//!
//!     #[entity(skip)]
//!     internal: u64,
//! }
//!
//! // Later, register the declaration:
//! Order::register();
//! ```
//!
//! # Attributes
//!
//! ## Struct attributes
//!
//! - `#[entity(class = "ns::Name")]` - Registered class name
//!   (defaults to the struct identifier).
//! - `#[entity(entity = false)]` - Exclude instances from recursive
//!   construction.
//! - `#[entity(annotation(key = "...", value = "..."))]` - Class-level
//!   annotation; repeat for multiple.
//!
//! ## Field attributes
//!
//! - `#[entity(var = "...")]` - Declared type expression (unions and array
//!   markers included); inferred from the Rust type when absent.
//! - `#[entity(format = "...")]` - Timestamp rendering format.
//! - `#[entity(annotation(key = "...", value = "..."))]` - Extra
//!   annotation; repeat for multiple.
//! - `#[entity(skip)]` - Leave the field out of the declaration.
//!
//! # Type inference
//!
//! `String` -> `string`, integer types -> `int`, `f32`/`f64` -> `float`,
//! `bool` -> `bool`, `Vec<T>` -> `T[]`, `Option<T>` -> `T`,
//! `DateTime` -> `DateTime`, map types -> `array`, `Value` -> `mixed`;
//! any other path becomes a namespaced class token resolved at schema-build
//! time.

mod entity;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro generating an `EntityReflect` implementation
///
/// The generated `class_def()` describes the struct's fields as annotated
/// properties; `register()` (a provided trait method) publishes the
/// declaration to the process-wide class registry.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::derive_entity(input).into()
}
