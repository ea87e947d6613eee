//! Annotation key/value storage
//!
//! Classes and properties carry free-form annotations. An external
//! annotation source (the `#[derive(Entity)]` macro, a declaration builder,
//! or any custom provider) supplies them as plain key -> string pairs; the
//! engine consumes the pairs and never sees comment syntax.
//!
//! Repeating a key collapses the entry into a multi-value annotation, so
//! providers can feed repeated annotation lines without pre-grouping them.

use serde::{Deserialize, Serialize};

/// A single annotation entry: one value, or several when the key repeats
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    One(String),
    Many(Vec<String>),
}

impl AnnotationValue {
    /// First value recorded under the key
    pub fn first(&self) -> &str {
        match self {
            Self::One(value) => value,
            Self::Many(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values recorded under the key, in insertion order
    pub fn all(&self) -> Vec<&str> {
        match self {
            Self::One(value) => vec![value.as_str()],
            Self::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::One(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Many(vec![first, value]);
            }
            Self::Many(values) => values.push(value),
        }
    }
}

/// Ordered annotation key -> value map
///
/// Insertion order is preserved. Inserting under an existing key appends to
/// that key's values instead of replacing them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationMap {
    entries: Vec<(String, AnnotationValue)>,
}

impl AnnotationMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value under a key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter().position(|(existing, _)| *existing == key) {
            Some(index) => self.entries[index].1.push(value),
            None => self.entries.push((key, AnnotationValue::One(value))),
        }
    }

    /// Entry for a key
    pub fn get(&self, key: &str) -> Option<&AnnotationValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// First value for a key
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).map(AnnotationValue::first)
    }

    /// Whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnotationValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnnotationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for AnnotationMap {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value() {
        let mut map = AnnotationMap::new();
        map.insert("var", "string $name");

        assert!(map.contains("var"));
        assert_eq!(map.first("var"), Some("string $name"));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_repeated_key_collapses_into_sequence() {
        let mut map = AnnotationMap::new();
        map.insert("see", "Order");
        map.insert("see", "Invoice");
        map.insert("see", "Customer");

        let entry = map.get("see").expect("entry should exist");
        assert_eq!(entry.all(), vec!["Order", "Invoice", "Customer"]);
        assert_eq!(entry.first(), "Order");
        // Still one key
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let map = AnnotationMap::from([("var", "string $a"), ("format", "ISO8601"), ("label", "A")]);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["var", "format", "label"]);
    }

    #[test]
    fn test_serde_round_trip() {
        let map = AnnotationMap::from([("see", "Order"), ("see", "Invoice"), ("var", "string $a")]);

        let encoded = serde_json::to_string(&map).expect("serialize");
        let decoded: AnnotationMap = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(map, decoded);
    }
}
