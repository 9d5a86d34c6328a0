//! # Creation Pipeline
//!
//! [`RegistryService`] turns an incoming creation request into a stored entity:
//!
//! 1. Validates the root shape `{ "<EntityType>": { ...document... } }`.
//! 2. Looks up the entity schema in the [`RegistryConfig`].
//! 3. Asks the selected [`IdGenService`] for the schema's identifier fields.
//! 4. Writes the generated values into the document.
//! 5. Inserts the document into the store, which enforces uniqueness.
//!
//! The pipeline never touches the relay itself. Wrap it in
//! [`EntityDataCapture`](crate::capture::EntityDataCapture) so generators that
//! need the document can see it.

use crate::capture::extract_root;
use crate::client::StoreClient;
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::id_gen::{select_id_gen, IdGenService};
use crate::payload::write_path;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Anything that can create an entity from a root creation request.
#[async_trait]
pub trait EntityCreator: Send + Sync {
    /// Create the entity and return its `osid`.
    async fn add_entity(&self, root: Value) -> Result<String, RegistryError>;
}

#[derive(Clone)]
pub struct RegistryService {
    config: Arc<RegistryConfig>,
    store: StoreClient,
    id_gen: Arc<dyn IdGenService>,
}

impl RegistryService {
    pub fn new(config: Arc<RegistryConfig>, store: StoreClient, id_gen: Arc<dyn IdGenService>) -> Self {
        Self {
            config,
            store,
            id_gen,
        }
    }

    /// Builds the service over whichever candidate [`select_id_gen`] prefers.
    pub fn with_generators(
        config: Arc<RegistryConfig>,
        store: StoreClient,
        candidates: Vec<Arc<dyn IdGenService>>,
    ) -> Result<Self, RegistryError> {
        let id_gen = select_id_gen(candidates).ok_or(RegistryError::NoIdGenerator)?;
        Ok(Self::new(config, store, id_gen))
    }

    pub fn id_gen(&self) -> &Arc<dyn IdGenService> {
        &self.id_gen
    }

    /// Registers the identifier formats of every configured schema.
    pub async fn save_id_formats(&self) -> Result<(), RegistryError> {
        for schema in &self.config.schemas {
            if !schema.unique_identifier_fields.is_empty() {
                self.id_gen
                    .save_id_format(&schema.unique_identifier_fields)
                    .await?;
            }
        }
        Ok(())
    }

    pub async fn get_entity(&self, entity_type: &str, osid: &str) -> Result<Value, RegistryError> {
        self.store
            .get(entity_type, osid)
            .await?
            .ok_or_else(|| RegistryError::NotFound(osid.to_string()))
    }
}

#[async_trait]
impl EntityCreator for RegistryService {
    #[instrument(skip(self, root))]
    async fn add_entity(&self, root: Value) -> Result<String, RegistryError> {
        let (entity_type, mut document) = extract_root(&root).ok_or_else(|| {
            RegistryError::InvalidPayload("expected an object keyed by entity type".to_string())
        })?;
        if !document.is_object() {
            return Err(RegistryError::InvalidPayload(format!(
                "{entity_type} document is not an object"
            )));
        }
        debug!(%entity_type, ?document, "add_entity called");

        let schema = self
            .config
            .schema(&entity_type)
            .ok_or_else(|| RegistryError::UnknownEntityType(entity_type.clone()))?;
        let fields = &schema.unique_identifier_fields;

        if !fields.is_empty() {
            let generated = self.id_gen.generate_id(fields).await?;
            if generated.is_empty() {
                debug!(%entity_type, service = self.id_gen.service_name(), "No identifiers generated");
            }
            for (path, value) in generated.iter() {
                if !write_path(&mut document, path, Value::String(value.to_string())) {
                    warn!(%entity_type, path, "Cannot write generated identifier");
                }
            }
        }

        let unique_fields = fields.iter().map(|f| f.field.clone()).collect();
        let osid = self.store.insert(&entity_type, document, unique_fields).await?;
        info!(%entity_type, %osid, "Entity added");
        Ok(osid)
    }
}
