//! Dynamic entity instances

use crate::value::{Value, ValueMap};

/// A constructed entity: a class name plus ordered field values
///
/// Blank instances start with no fields set; the construction front door
/// writes coerced values into them. Fields keep insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    class_name: String,
    fields: Vec<(String, Value)>,
}

impl Instance {
    /// Create an empty instance without running any construction logic
    pub fn blank(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            fields: Vec::new(),
        }
    }

    /// Name of the class this instance was constructed as
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Set a field, replacing an existing entry or appending a new one
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter().position(|(name, _)| *name == field) {
            Some(index) => self.fields[index].1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Fields in insertion order
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Flatten this instance into a plain map, recursing through nested
    /// entities, lists and maps
    pub fn to_map(&self) -> ValueMap {
        self.fields
            .iter()
            .map(|(name, value)| (name.clone(), flatten(value)))
            .collect()
    }

    /// Copy out only the named fields
    pub fn export(&self, keys: &[&str]) -> ValueMap {
        self.fields
            .iter()
            .filter(|(name, _)| keys.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

fn flatten(value: &Value) -> Value {
    match value {
        Value::Entity(instance) => Value::Map(instance.to_map()),
        Value::List(items) => Value::List(items.iter().map(flatten).collect()),
        Value::Map(map) => Value::Map(
            map.entries()
                .iter()
                .map(|(key, nested)| (key.clone(), flatten(nested)))
                .collect(),
        ),
        other => other.clone(),
    }
}
