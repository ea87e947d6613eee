//! Persisted schema artifacts
//!
//! One JSON artifact per `(class, fingerprint)` pair. Artifacts are
//! self-describing: a kind tag, the owning class's identity and the property
//! records needed to rebuild a [`ClassSchema`] without re-deriving it.
//! Readers treat missing, foreign or unreadable artifacts as a plain cache
//! miss; writers log failures and carry on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::annotations::AnnotationMap;
use crate::config::CacheConfig;
use crate::schema::{ClassSchema, PropertySchema, TypeDescriptor};

/// Kind tag stored in every artifact so readers can reject foreign files
const ARTIFACT_KIND: &str = "hydrate.class-schema";
const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SchemaArtifact {
    kind: String,
    version: u32,
    class_name: String,
    fingerprint: u64,
    annotations: AnnotationMap,
    properties: Vec<PropertyRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PropertyRecord {
    name: String,
    types: Vec<TypeDescriptor>,
    annotations: AnnotationMap,
    #[serde(default)]
    is_static: bool,
}

impl SchemaArtifact {
    fn from_schema(schema: &ClassSchema) -> Self {
        Self {
            kind: ARTIFACT_KIND.to_string(),
            version: ARTIFACT_VERSION,
            class_name: schema.class_name().to_string(),
            fingerprint: schema.fingerprint(),
            annotations: schema.annotations().clone(),
            properties: schema
                .properties()
                .iter()
                .map(|property| PropertyRecord {
                    name: property.name().to_string(),
                    types: property.types().to_vec(),
                    annotations: property.annotations().clone(),
                    is_static: property.is_static(),
                })
                .collect(),
        }
    }

    fn into_schema(self) -> ClassSchema {
        let properties = self
            .properties
            .into_iter()
            .map(|record| {
                PropertySchema::new(record.name, record.types, record.annotations, record.is_static)
            })
            .collect();
        ClassSchema::new(self.class_name, self.fingerprint, self.annotations, properties)
    }
}

/// Content-addressed on-disk schema store
#[derive(Debug, Clone)]
pub struct SchemaStore {
    dir: PathBuf,
}

impl SchemaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store from config; `None` when the persisted tier is disabled
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        config.enabled.then(|| Self::new(&config.dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn artifact_path(&self, class_name: &str, fingerprint: u64) -> PathBuf {
        let file_name = format!("{}-{fingerprint:016x}.json", class_name.replace("::", "_"));
        self.dir.join(file_name)
    }

    /// Read the artifact for `(class, fingerprint)`; any failure is a miss
    pub fn load(&self, class_name: &str, fingerprint: u64) -> Option<ClassSchema> {
        let path = self.artifact_path(class_name, fingerprint);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => {
                trace!("No schema artifact for '{}' at {:?}", class_name, path);
                return None;
            }
        };

        match serde_json::from_str::<SchemaArtifact>(&content) {
            Ok(artifact)
                if artifact.kind == ARTIFACT_KIND
                    && artifact.class_name == class_name
                    && artifact.fingerprint == fingerprint =>
            {
                debug!("Loaded schema artifact for '{}' from {:?}", class_name, path);
                Some(artifact.into_schema())
            }
            Ok(_) => {
                warn!("Ignoring mismatched schema artifact at {:?}", path);
                None
            }
            Err(error) => {
                warn!("Ignoring unreadable schema artifact at {:?}: {}", path, error);
                None
            }
        }
    }

    /// Write the artifact for a schema; failures are logged and swallowed
    pub fn save(&self, schema: &ClassSchema) {
        if let Err(error) = self.try_save(schema) {
            warn!(
                "Failed to persist schema for '{}': {}",
                schema.class_name(),
                error
            );
        }
    }

    fn try_save(&self, schema: &ClassSchema) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let artifact = SchemaArtifact::from_schema(schema);
        let content = serde_json::to_string_pretty(&artifact).map_err(io::Error::other)?;
        let path = self.artifact_path(schema.class_name(), schema.fingerprint());
        fs::write(&path, content)?;
        debug!(
            "Stored schema artifact for '{}' at {:?}",
            schema.class_name(),
            path
        );
        Ok(())
    }

    /// Load every artifact in the store directory
    ///
    /// Foreign and unreadable files are skipped; a missing directory yields
    /// an empty list.
    pub fn load_all(&self) -> Vec<ClassSchema> {
        let mut schemas = Vec::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return schemas,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            match serde_json::from_str::<SchemaArtifact>(&content) {
                Ok(artifact) if artifact.kind == ARTIFACT_KIND => {
                    schemas.push(artifact.into_schema());
                }
                _ => trace!("Skipping foreign file in schema store: {:?}", path),
            }
        }
        schemas
    }
}
