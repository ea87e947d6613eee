//! Schema model - typed property schemas derived from class declarations
//!
//! The schema subsystem turns raw class declarations (names plus annotation
//! text) into structured, cacheable schemas:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ ClassDef (registry)                                      │
//! │   "shop::Order", properties with `var` annotations       │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │ SchemaBuilder::build
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │ ClassSchema                                              │
//! │   fingerprint (content hash)                             │
//! │   PropertySchema per property                            │
//! │     TypeDescriptor per declared type alternative         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Declared type expressions support unions (`Address|string`), array
//! markers (`Address[]`) and namespaced class references resolved against
//! the declaring class's namespace.

pub mod builder;
pub mod class;
pub mod hash;
pub mod property;
pub mod types;

pub use builder::{SchemaBuilder, SchemaError};
pub use class::{ClassSchema, FilterFlags, PropertyFilter};
pub use property::PropertySchema;
pub use types::{TypeDescriptor, BASIC_TYPES};
