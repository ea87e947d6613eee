//! Two-tier schema cache
//!
//! Schema derivation is cheap per property but adds up across large class
//! graphs, so derived schemas are memoized twice:
//!
//! - **Memory tier**: a process-lifetime map consulted first on every
//!   lookup; entries are never evicted (an explicit [`SchemaCache::clear`]
//!   exists for tests and full resets).
//! - **Persisted tier**: one artifact per `(class, fingerprint)` written
//!   through on build. A changed declaration changes the fingerprint, so
//!   stale artifacts are simply never looked up again; they are not actively
//!   deleted.
//!
//! Store I/O failures never surface to callers: reads degrade to a rebuild,
//! writes are logged and skipped.

mod store;

pub use store::SchemaStore;

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::registry::ClassRegistry;
use crate::schema::{ClassSchema, SchemaBuilder, SchemaError};

/// Two-tier cache of derived class schemas
///
/// The cache owns every [`ClassSchema`] it hands out; callers receive shared
/// read-only views.
pub struct SchemaCache {
    memory: DashMap<String, Arc<ClassSchema>>,
    store: Option<SchemaStore>,
}

impl SchemaCache {
    /// Cache backed by both tiers
    pub fn new(store: SchemaStore) -> Self {
        Self {
            memory: DashMap::new(),
            store: Some(store),
        }
    }

    /// Memory-only cache (no persisted tier)
    pub fn in_memory() -> Self {
        Self {
            memory: DashMap::new(),
            store: None,
        }
    }

    /// Cache configured from settings
    pub fn from_config(config: &CacheConfig) -> Self {
        match SchemaStore::from_config(config) {
            Some(store) => Self::new(store),
            None => Self::in_memory(),
        }
    }

    /// The persisted tier, when one is configured
    pub fn store(&self) -> Option<&SchemaStore> {
        self.store.as_ref()
    }

    /// Get the schema for a class, deriving and caching it on first need
    pub fn get(
        &self,
        registry: &ClassRegistry,
        class_name: &str,
    ) -> Result<Arc<ClassSchema>, SchemaError> {
        self.get_with(registry, class_name, true)
    }

    /// Get the schema, optionally bypassing the persisted tier
    ///
    /// The memory tier is always consulted first.
    pub fn get_with(
        &self,
        registry: &ClassRegistry,
        class_name: &str,
        use_store: bool,
    ) -> Result<Arc<ClassSchema>, SchemaError> {
        if let Some(schema) = self.memory.get(class_name) {
            trace!("Memory cache hit for '{}'", class_name);
            return Ok(Arc::clone(&schema));
        }

        let def = registry
            .get(class_name)
            .ok_or_else(|| SchemaError::UnknownClass(class_name.to_string()))?;
        let fingerprint = def.fingerprint();

        if use_store {
            if let Some(schema) = self
                .store
                .as_ref()
                .and_then(|store| store.load(class_name, fingerprint))
            {
                let schema = Arc::new(schema);
                self.memory.insert(class_name.to_string(), Arc::clone(&schema));
                return Ok(schema);
            }
        }

        let schema = Arc::new(SchemaBuilder::new(registry).build_def(&def)?);
        if let Some(store) = &self.store {
            store.save(&schema);
        }
        self.memory.insert(class_name.to_string(), Arc::clone(&schema));
        debug!(
            "Derived schema for '{}' (fingerprint {:016x})",
            class_name, fingerprint
        );
        Ok(schema)
    }

    /// Drop every memory-tier entry
    ///
    /// Persisted artifacts are untouched.
    pub fn clear(&self) {
        self.memory.clear();
    }

    /// Number of schemas in the memory tier
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Every schema currently persisted in the store
    pub fn persisted(&self) -> SchemaList {
        let mut list = SchemaList::new();
        if let Some(store) = &self.store {
            for schema in store.load_all() {
                list.add(schema);
            }
        }
        list
    }
}

/// Keyed collection of class schemas
#[derive(Default)]
pub struct SchemaList {
    schemas: Vec<Arc<ClassSchema>>,
}

impl SchemaList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema, replacing any existing entry for the same class
    pub fn add(&mut self, schema: impl Into<Arc<ClassSchema>>) {
        let schema = schema.into();
        match self
            .schemas
            .iter()
            .position(|existing| existing.class_name() == schema.class_name())
        {
            Some(index) => self.schemas[index] = schema,
            None => self.schemas.push(schema),
        }
    }

    pub fn get(&self, class_name: &str) -> Option<&Arc<ClassSchema>> {
        self.schemas
            .iter()
            .find(|schema| schema.class_name() == class_name)
    }

    pub fn has(&self, class_name: &str) -> bool {
        self.get(class_name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|schema| schema.class_name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClassSchema>> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Fold another list in, replacing same-name entries
    pub fn merge(&mut self, other: SchemaList) {
        for schema in other.schemas {
            self.add(schema);
        }
    }
}
