//! Value coercion engine
//!
//! Coercion turns a raw field value into the shape demanded by a property's
//! declared types: scalars are cast by kind, date/time classes parse into
//! timestamps and entity classes trigger recursive construction. The engine
//! is deliberately permissive - input that does not fit the declared type is
//! returned unchanged, never rejected. The only hard failures are those
//! raised while constructing nested entities.
//!
//! Dispatch order, first match wins:
//!
//! 1. null input stays null, whatever the declared type;
//! 2. a union with several class-typed alternatives and a map input is
//!    narrowed to one alternative by structural overlap;
//! 3. the single remaining descriptor drives a per-kind cast.

mod datetime;

use tracing::trace;

use crate::cache::SchemaCache;
use crate::entity::{self, CreateOptions, EntityError, Instance};
use crate::registry::ClassRegistry;
use crate::schema::{PropertySchema, TypeDescriptor};
use crate::value::{Value, ValueMap};

/// Literal synonyms normalized for declared `bool` properties
const BOOL_SYNONYMS: [&str; 4] = ["0", "1", "true", "false"];

/// Coerces raw values against property schemas
pub struct CoercionEngine<'a> {
    registry: &'a ClassRegistry,
    cache: &'a SchemaCache,
}

impl<'a> CoercionEngine<'a> {
    pub fn new(registry: &'a ClassRegistry, cache: &'a SchemaCache) -> Self {
        Self { registry, cache }
    }

    /// Coerce a raw value to a property's declared type
    pub fn coerce(
        &self,
        property: &PropertySchema,
        value: Value,
        force_unknown_fields: bool,
        cast_entities: bool,
    ) -> Result<Value, EntityError> {
        let Some(descriptor) = self.choose_type(property, &value) else {
            return Ok(value);
        };
        self.cast(property, descriptor, value, force_unknown_fields, cast_entities)
    }

    /// Pick the descriptor that drives the cast
    ///
    /// A union with more than one class-typed alternative is disambiguated
    /// against map input; everything else uses the first declared type.
    fn choose_type<'p>(
        &self,
        property: &'p PropertySchema,
        value: &Value,
    ) -> Option<&'p TypeDescriptor> {
        if let Value::Map(map) = value {
            let candidates = property.class_types(self.registry);
            if candidates.len() > 1 {
                return self.best_match(&candidates, map);
            }
        }
        property.first_type()
    }

    /// Candidate with the highest key-overlap ratio; ties keep the earliest
    /// declared candidate
    fn best_match<'p>(
        &self,
        candidates: &[&'p TypeDescriptor],
        map: &ValueMap,
    ) -> Option<&'p TypeDescriptor> {
        let mut best: Option<(&'p TypeDescriptor, f64)> = None;
        for candidate in candidates.iter().copied() {
            let ratio = self.match_ratio(candidate.resolved(), map);
            trace!(
                "Union candidate '{}' matches input at {:.2}",
                candidate.resolved(),
                ratio
            );
            let better = match best {
                Some((_, best_ratio)) => ratio > best_ratio,
                None => true,
            };
            if better {
                best = Some((candidate, ratio));
            }
        }
        best.map(|(descriptor, _)| descriptor)
    }

    /// Share of input keys that are declared properties of the candidate
    fn match_ratio(&self, class_name: &str, map: &ValueMap) -> f64 {
        if map.is_empty() {
            return 0.0;
        }
        let Some(def) = self.registry.get(class_name) else {
            return 0.0;
        };
        let declared = def.property_names();
        let overlap = map.keys().filter(|key| declared.contains(key)).count();
        overlap as f64 / map.len() as f64
    }

    fn cast(
        &self,
        property: &PropertySchema,
        descriptor: &TypeDescriptor,
        value: Value,
        force_unknown_fields: bool,
        cast_entities: bool,
    ) -> Result<Value, EntityError> {
        // Null does not need to be cast
        if value.is_null() {
            return Ok(Value::Null);
        }

        match descriptor.resolved() {
            "string" => Ok(cast_string(value)),
            "int" => Ok(cast_int(value)),
            "float" | "double" => Ok(cast_float(value)),
            "bool" => Ok(cast_bool(value)),
            "mixed" => Ok(cast_mixed(value)),
            _ if descriptor.is_class(self.registry) => {
                self.cast_class(property, descriptor, value, force_unknown_fields, cast_entities)
            }
            _ => Ok(value),
        }
    }

    fn cast_class(
        &self,
        property: &PropertySchema,
        descriptor: &TypeDescriptor,
        value: Value,
        force_unknown_fields: bool,
        cast_entities: bool,
    ) -> Result<Value, EntityError> {
        // Already-constructed objects pass through untouched
        if value.is_object() {
            return Ok(value);
        }
        if descriptor.is_datetime() {
            return Ok(self.cast_datetime(property, value));
        }
        if cast_entities && descriptor.is_entity(self.registry) {
            return self.cast_entity(descriptor, value, force_unknown_fields);
        }
        Ok(value)
    }

    /// Date/time coercion: text parses into a timestamp, and a `format`
    /// annotation controls the rendered shape
    fn cast_datetime(&self, property: &PropertySchema, value: Value) -> Value {
        match value {
            Value::Text(text) => match datetime::parse_timestamp(&text) {
                Some(timestamp) => match property.annotation("format") {
                    Some("ISO8601") | Some("c") => Value::Text(datetime::to_iso8601(&timestamp)),
                    Some(format) => Value::Text(datetime::format_timestamp(&timestamp, format)),
                    None => Value::Timestamp(timestamp),
                },
                None => Value::Text(text),
            },
            other => other,
        }
    }

    /// Nested entity construction
    fn cast_entity(
        &self,
        descriptor: &TypeDescriptor,
        value: Value,
        force_unknown_fields: bool,
    ) -> Result<Value, EntityError> {
        let class_name = descriptor.resolved();

        if descriptor.is_array() {
            // A bare mapping counts as a one-element collection
            let items = match value {
                Value::List(items) => items,
                Value::Map(map) => vec![Value::Map(map)],
                other => return Ok(other),
            };
            let mut constructed = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Map(map) => constructed.push(Value::Entity(self.construct(
                        class_name,
                        &map,
                        force_unknown_fields,
                    )?)),
                    // Already-constructed elements (and stray scalars) pass through
                    other => constructed.push(other),
                }
            }
            Ok(Value::List(constructed))
        } else {
            // Tolerate a single object wrapped in a collection
            let value = match value {
                Value::List(items) if !items.is_empty() => {
                    items.into_iter().next().unwrap_or(Value::Null)
                }
                other => other,
            };
            match value {
                Value::Map(map) => Ok(Value::Entity(self.construct(
                    class_name,
                    &map,
                    force_unknown_fields,
                )?)),
                other => Ok(other),
            }
        }
    }

    fn construct(
        &self,
        class_name: &str,
        fields: &ValueMap,
        force_unknown_fields: bool,
    ) -> Result<Instance, EntityError> {
        let options = CreateOptions {
            force_unknown_fields,
            ..CreateOptions::default()
        };
        entity::build(self.registry, self.cache, class_name, Some(fields), &options)
    }
}

/// Render a value as text; collections and objects are left alone
fn cast_string(value: Value) -> Value {
    match value {
        Value::Timestamp(timestamp) => Value::Text(datetime::to_iso8601(&timestamp)),
        Value::Bool(flag) => Value::Text(if flag { "true" } else { "false" }.to_string()),
        Value::Int(number) => Value::Text(number.to_string()),
        Value::Float(number) => Value::Text(number.to_string()),
        other => other,
    }
}

/// Whether text parses as a number
fn is_numeric_text(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text.parse::<f64>().is_ok()
}

/// Integer cast: only numeric input without a decimal point converts
fn cast_int(value: Value) -> Value {
    match value {
        Value::Int(number) => Value::Int(number),
        Value::Float(number) if number.fract() == 0.0 => Value::Int(number as i64),
        Value::Text(text) => {
            if is_numeric_text(&text) && !text.contains('.') {
                if let Ok(parsed) = text.trim().parse::<i64>() {
                    return Value::Int(parsed);
                }
            }
            Value::Text(text)
        }
        other => other,
    }
}

/// Float cast: only numeric input containing a decimal point converts
fn cast_float(value: Value) -> Value {
    match value {
        Value::Float(number) => Value::Float(number),
        Value::Text(text) => {
            if is_numeric_text(&text) && text.contains('.') {
                if let Ok(parsed) = text.trim().parse::<f64>() {
                    return Value::Float(parsed);
                }
            }
            Value::Text(text)
        }
        other => other,
    }
}

/// Boolean cast: only the literal synonym set normalizes
fn cast_bool(value: Value) -> Value {
    match value {
        Value::Bool(flag) => Value::Bool(flag),
        Value::Text(text) if BOOL_SYNONYMS.contains(&text.as_str()) => {
            Value::Bool(matches!(text.as_str(), "1" | "true"))
        }
        other => other,
    }
}

/// Best-effort inference for `mixed` declarations
///
/// Numeric text becomes an int or float by the decimal-point rule. Boolean
/// literal text stays text; only a declared `bool` normalizes it.
fn cast_mixed(value: Value) -> Value {
    match value {
        Value::Text(text) => {
            if is_numeric_text(&text) {
                if text.contains('.') {
                    if let Ok(parsed) = text.trim().parse::<f64>() {
                        return Value::Float(parsed);
                    }
                } else if let Ok(parsed) = text.trim().parse::<i64>() {
                    return Value::Int(parsed);
                }
            }
            Value::Text(text)
        }
        other => other,
    }
}
