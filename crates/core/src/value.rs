//! Dynamic value model
//!
//! The engine moves field data around as [`Value`]: untyped input comes in
//! as maps, lists and scalars, and coercion produces typed variants such as
//! [`Value::Timestamp`] and [`Value::Entity`]. Conversions to and from
//! `serde_json::Value` cover the common case where raw input originates
//! from JSON.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::entity::Instance;

/// A dynamically-typed field value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Ordered sequence of values
    List(Vec<Value>),
    /// String-keyed mapping, insertion order preserved
    Map(ValueMap),
    Timestamp(DateTime<Utc>),
    /// A constructed entity instance
    Entity(Instance),
}

impl Value {
    /// Variant name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Timestamp(_) => "timestamp",
            Self::Entity(_) => "entity",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this value is an already-constructed object
    ///
    /// Object values pass through class-typed coercion untouched.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Timestamp(_) | Self::Entity(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Instance> {
        match self {
            Self::Entity(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_entity_mut(&mut self) -> Option<&mut Instance> {
        match self {
            Self::Entity(instance) => Some(instance),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Self::Map(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Instance> for Value {
    fn from(value: Instance) -> Self {
        Self::Entity(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(raw: serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(number) => number
                .as_i64()
                .map(Self::Int)
                .or_else(|| number.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            serde_json::Value::String(text) => Self::Text(text),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Int(value) => Self::Number(value.into()),
            Value::Float(value) => serde_json::Number::from_f64(value)
                .map(Self::Number)
                .unwrap_or(Self::Null),
            Value::Text(text) => Self::String(text),
            Value::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Map(map) => Self::Object(
                map.into_entries()
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            Value::Timestamp(timestamp) => {
                Self::String(timestamp.to_rfc3339_opts(SecondsFormat::Secs, false))
            }
            Value::Entity(instance) => Self::from(Value::Map(instance.to_map())),
        }
    }
}

/// Insertion-ordered string-keyed value map
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueMap {
    entries: Vec<(String, Value)>,
}

impl ValueMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing an existing entry or appending a new one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter().position(|(existing, _)| *existing == key) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(String, Value)> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for ValueMap {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_insert_replaces() {
        let mut map = ValueMap::new();
        map.insert("a", 1i64);
        map.insert("b", 2i64);
        map.insert("a", 3i64);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&Value::Int(3)));
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_object_detection() {
        assert!(Value::Entity(Instance::blank("Order")).is_object());
        assert!(Value::Timestamp(DateTime::<Utc>::UNIX_EPOCH).is_object());
        assert!(!Value::Text("order".to_string()).is_object());
        assert!(!Value::Map(ValueMap::new()).is_object());
    }

    #[test]
    fn test_from_json() {
        let raw = json!({
            "name": "order-1",
            "total": 12.5,
            "count": 3,
            "open": true,
            "tags": ["a", "b"],
            "nested": {"x": null}
        });

        let value = Value::from(raw);
        let map = value.as_map().expect("object should become a map");
        assert_eq!(map.get("name"), Some(&Value::Text("order-1".to_string())));
        assert_eq!(map.get("total"), Some(&Value::Float(12.5)));
        assert_eq!(map.get("count"), Some(&Value::Int(3)));
        assert_eq!(map.get("open"), Some(&Value::Bool(true)));
        assert_eq!(
            map.get("tags"),
            Some(&Value::List(vec![
                Value::Text("a".to_string()),
                Value::Text("b".to_string())
            ]))
        );
        let nested = map.get("nested").and_then(Value::as_map).expect("nested map");
        assert_eq!(nested.get("x"), Some(&Value::Null));
    }

    #[test]
    fn test_to_json_timestamp_renders_iso8601() {
        let value = Value::Timestamp(DateTime::<Utc>::UNIX_EPOCH);
        let raw = serde_json::Value::from(value);
        assert_eq!(raw, json!("1970-01-01T00:00:00+00:00"));
    }

    #[test]
    fn test_to_json_entity_flattens() {
        let mut instance = Instance::blank("Order");
        instance.set("reference", "ord-1");
        instance.set("total", Value::Float(9.5));

        let raw = serde_json::Value::from(Value::Entity(instance));
        assert_eq!(raw, json!({"reference": "ord-1", "total": 9.5}));
    }
}
