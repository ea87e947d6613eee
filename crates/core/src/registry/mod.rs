//! Class registry - the set of classes known to the engine
//!
//! Type tokens in property declarations refer to classes by name, so the
//! engine needs a name -> declaration lookup to resolve them and to drive
//! nested construction. A process-wide default registry backs the
//! free-function API; tests and embedders can scope their own
//! [`ClassRegistry`] instances.

mod def;

pub use def::{ClassDef, ClassDefBuilder, PropertyDef};

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::debug;

/// Name -> class declaration map
///
/// Reads vastly outnumber registrations, hence the read-mostly lock.
pub struct ClassRegistry {
    classes: RwLock<HashMap<String, Arc<ClassDef>>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self {
            classes: RwLock::new(HashMap::new()),
        }
    }

    /// Register a declaration, replacing any previous one under the name
    pub fn register(&self, def: ClassDef) -> Arc<ClassDef> {
        let def = Arc::new(def);
        let mut classes = self.classes.write();
        if let Some(existing) = classes.get(def.class_name()) {
            if existing.fingerprint() != def.fingerprint() {
                debug!("Replacing declaration for class '{}'", def.class_name());
            }
        }
        classes.insert(def.class_name().to_string(), Arc::clone(&def));
        def
    }

    pub fn get(&self, class_name: &str) -> Option<Arc<ClassDef>> {
        self.classes.read().get(class_name).cloned()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.read().contains_key(class_name)
    }

    /// Registered class names (no particular order)
    pub fn names(&self) -> Vec<String> {
        self.classes.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }

    /// Remove every registered declaration
    ///
    /// Use with caution - typically only needed for tests or full resets.
    pub fn clear(&self) {
        self.classes.write().clear();
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide default registry
static REGISTRY: LazyLock<ClassRegistry> = LazyLock::new(ClassRegistry::new);

/// The process-wide default registry
pub fn global() -> &'static ClassRegistry {
    &REGISTRY
}

/// Register a declaration with the process-wide registry
pub fn register(def: ClassDef) -> Arc<ClassDef> {
    REGISTRY.register(def)
}

/// Look up a declaration in the process-wide registry
pub fn lookup(class_name: &str) -> Option<Arc<ClassDef>> {
    REGISTRY.get(class_name)
}

/// Whether a class is registered in the process-wide registry
pub fn is_registered(class_name: &str) -> bool {
    REGISTRY.contains(class_name)
}

/// Implemented by types that can describe themselves as a class declaration
///
/// Usually generated by `#[derive(Entity)]`; manual implementations work the
/// same way.
pub trait EntityReflect {
    /// Name the class registers under
    const CLASS_NAME: &'static str;

    /// Produce the class declaration
    fn class_def() -> ClassDef;

    /// Register the declaration with the process-wide registry
    fn register() -> Arc<ClassDef> {
        register(Self::class_def())
    }
}
