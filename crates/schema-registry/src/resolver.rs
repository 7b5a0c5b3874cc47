//! Topic schema resolution.
//!
//! A topic's schema is looked up under the subject named after the topic.
//! When nothing is registered yet, the local definition file is read and
//! registered. Whatever comes back is held for the rest of the run.

use crate::client::{SchemaDescriptor, SchemaRegistry, SchemaType};
use crate::error::{Result, SchemaRegistryError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

/// Local schema definition file registered when a subject is empty.
#[derive(Debug, Clone)]
pub struct SchemaSource {
    path: PathBuf,
    schema_type: SchemaType,
}

impl SchemaSource {
    pub fn new(path: impl Into<PathBuf>, schema_type: SchemaType) -> Self {
        Self {
            path: path.into(),
            schema_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema_type(&self) -> SchemaType {
        self.schema_type
    }

    /// Read the definition text. An unreadable or blank file is an error,
    /// never an empty registration.
    pub fn read_definition(&self) -> Result<String> {
        let definition =
            std::fs::read_to_string(&self.path).map_err(|e| SchemaRegistryError::Definition {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        if definition.trim().is_empty() {
            return Err(SchemaRegistryError::Definition {
                path: self.path.clone(),
                message: "file is empty".to_string(),
            });
        }

        Ok(definition)
    }
}

/// Resolves (and if needed registers) the schema for a topic.
pub struct SchemaResolver<R> {
    registry: R,
    source: SchemaSource,
    resolved: Mutex<HashMap<String, SchemaDescriptor>>,
}

impl<R: SchemaRegistry> SchemaResolver<R> {
    pub fn new(registry: R, source: SchemaSource) -> Self {
        Self {
            registry,
            source,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Return the authoritative schema for `topic`.
    ///
    /// An existing schema is returned as-is, without compatibility checks.
    /// Otherwise the local definition is registered exactly once.
    pub async fn resolve(&self, topic: &str) -> Result<SchemaDescriptor> {
        // Held across the registry calls so concurrent callers cannot both
        // register.
        let mut resolved = self.resolved.lock().await;
        if let Some(descriptor) = resolved.get(topic) {
            return Ok(descriptor.clone());
        }

        let descriptor = match self.registry.latest_schema(topic).await? {
            Some(existing) => {
                info!(
                    "Using schema {} (version {:?}) already registered for '{}'",
                    existing.id, existing.version, topic
                );
                existing
            }
            None => {
                let definition = self.source.read_definition()?;
                info!(
                    "No schema registered for '{}', registering {:?}",
                    topic,
                    self.source.path()
                );
                let registered = self
                    .registry
                    .register_schema(topic, &definition, self.source.schema_type())
                    .await?;
                info!("Registered schema {} for '{}'", registered.id, topic);
                registered
            }
        };

        resolved.insert(topic.to_string(), descriptor.clone());
        Ok(descriptor)
    }
}
