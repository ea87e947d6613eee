//! Class declarations
//!
//! A [`ClassDef`] is the raw, annotation-carrying description of one class:
//! its namespaced name, class-level annotations and declared properties.
//! Declarations are what providers register; the schema builder derives
//! typed [`crate::schema::ClassSchema`] values from them.

use crate::annotations::AnnotationMap;
use crate::schema::hash;

/// One declared property of a class
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDef {
    pub(crate) name: String,
    pub(crate) annotations: AnnotationMap,
    pub(crate) is_static: bool,
}

impl PropertyDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }
}

/// A class declaration
///
/// Class names are namespaced with `::` (e.g. `shop::Order`); type tokens in
/// property declarations resolve against the declaring class's namespace
/// before they are tried literally.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    class_name: String,
    annotations: AnnotationMap,
    properties: Vec<PropertyDef>,
    entity: bool,
}

impl ClassDef {
    /// Start building a declaration
    pub fn builder(class_name: impl Into<String>) -> ClassDefBuilder {
        ClassDefBuilder {
            def: ClassDef {
                class_name: class_name.into(),
                annotations: AnnotationMap::new(),
                properties: Vec::new(),
                entity: true,
            },
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Namespace portion of the class name (empty when unqualified)
    pub fn namespace(&self) -> &str {
        match self.class_name.rfind("::") {
            Some(index) => &self.class_name[..index],
            None => "",
        }
    }

    /// Unqualified portion of the class name
    pub fn short_name(&self) -> &str {
        match self.class_name.rfind("::") {
            Some(index) => &self.class_name[index + 2..],
            None => &self.class_name,
        }
    }

    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    /// Declared properties in declaration order
    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// Names of the declared non-static properties, in declaration order
    ///
    /// Union disambiguation compares these against input keys.
    pub fn property_names(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|property| !property.is_static)
            .map(|property| property.name.as_str())
            .collect()
    }

    /// Whether instances of this class participate in recursive construction
    pub fn is_entity(&self) -> bool {
        self.entity
    }

    /// Content hash of the declaration
    ///
    /// Any change to the name, annotations or properties produces a new
    /// fingerprint, which is what invalidates persisted schema artifacts.
    pub fn fingerprint(&self) -> u64 {
        let mut segments: Vec<&str> = vec![&self.class_name];
        segments.push(if self.entity { "entity" } else { "plain" });
        collect_annotation_segments(&self.annotations, &mut segments);
        for property in &self.properties {
            segments.push(&property.name);
            segments.push(if property.is_static { "static" } else { "instance" });
            collect_annotation_segments(&property.annotations, &mut segments);
        }
        hash::fingerprint(segments)
    }
}

fn collect_annotation_segments<'a>(annotations: &'a AnnotationMap, segments: &mut Vec<&'a str>) {
    for (key, value) in annotations.iter() {
        segments.push(key);
        segments.extend(value.all());
    }
}

/// Builder for [`ClassDef`]
pub struct ClassDefBuilder {
    def: ClassDef,
}

impl ClassDefBuilder {
    /// Add a class-level annotation
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.def.annotations.insert(key, value);
        self
    }

    /// Add a property with its annotation map
    pub fn property(mut self, name: impl Into<String>, annotations: AnnotationMap) -> Self {
        self.def.properties.push(PropertyDef {
            name: name.into(),
            annotations,
            is_static: false,
        });
        self
    }

    /// Add a static property (excluded from listings and disambiguation)
    pub fn static_property(mut self, name: impl Into<String>, annotations: AnnotationMap) -> Self {
        self.def.properties.push(PropertyDef {
            name: name.into(),
            annotations,
            is_static: true,
        });
        self
    }

    /// Shorthand for a property declared only with a type expression
    ///
    /// `.field("address", "Address|string")` records the annotation
    /// `var = "Address|string $address"`.
    pub fn field(self, name: &str, type_decl: &str) -> Self {
        let annotations = AnnotationMap::from([("var", format!("{type_decl} ${name}"))]);
        self.property(name, annotations)
    }

    /// Mark whether instances participate in recursive construction
    pub fn entity(mut self, entity: bool) -> Self {
        self.def.entity = entity;
        self
    }

    pub fn build(self) -> ClassDef {
        self.def
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_split() {
        let def = ClassDef::builder("shop::billing::Order").build();
        assert_eq!(def.namespace(), "shop::billing");
        assert_eq!(def.short_name(), "Order");

        let bare = ClassDef::builder("Order").build();
        assert_eq!(bare.namespace(), "");
        assert_eq!(bare.short_name(), "Order");
    }

    #[test]
    fn test_field_shorthand_writes_var_annotation() {
        let def = ClassDef::builder("Order").field("address", "Address|string").build();

        let property = def.property("address").expect("property should exist");
        assert_eq!(property.annotations().first("var"), Some("Address|string $address"));
    }

    #[test]
    fn test_property_names_skip_static() {
        let def = ClassDef::builder("Order")
            .field("reference", "string")
            .static_property("instances", AnnotationMap::from([("var", "int $instances")]))
            .field("total", "float")
            .build();

        assert_eq!(def.property_names(), vec!["reference", "total"]);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let base = ClassDef::builder("Order").field("reference", "string").build();
        let same = ClassDef::builder("Order").field("reference", "string").build();
        let renamed = ClassDef::builder("Order").field("number", "string").build();
        let retyped = ClassDef::builder("Order").field("reference", "int").build();
        let annotated = ClassDef::builder("Order")
            .annotation("label", "Order")
            .field("reference", "string")
            .build();

        assert_eq!(base.fingerprint(), same.fingerprint());
        assert_ne!(base.fingerprint(), renamed.fingerprint());
        assert_ne!(base.fingerprint(), retyped.fingerprint());
        assert_ne!(base.fingerprint(), annotated.fingerprint());
    }

    #[test]
    fn test_fingerprint_tracks_entity_flag() {
        let entity = ClassDef::builder("Money").field("amount", "int").build();
        let plain = ClassDef::builder("Money").field("amount", "int").entity(false).build();
        assert_ne!(entity.fingerprint(), plain.fingerprint());
    }
}
