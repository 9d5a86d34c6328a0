use crate::id_gen::WaterFacilityIdGenService;
use crate::model::{WATER_FACILITY, WF_ID_FIELD};
use registry_framework::{
    EntityCreator, EntityDataCapture, EntitySchema, IdGenService, RegistryConfig, RegistryError,
    RegistryService, RegistryStore, SearchService, SequenceIdGenService,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Schemas registered when no configuration file is given.
pub fn default_schemas() -> Vec<EntitySchema> {
    vec![
        EntitySchema::new(WATER_FACILITY).with_identifier(format!("/{WF_ID_FIELD}")),
        EntitySchema::new("Organisation"),
    ]
}

/// Configuration with [`default_schemas`].
pub fn default_config() -> RegistryConfig {
    default_schemas()
        .into_iter()
        .fold(RegistryConfig::default(), RegistryConfig::with_schema)
}

/// The running registry: one store actor behind a capturing creation pipeline.
///
/// # Example
///
/// ```ignore
/// let system = RegistrySystem::new(default_config())?;
/// let osid = system.add_entity(json!({ "WaterFacility": { ... } })).await?;
/// system.shutdown().await?;
/// ```
pub struct RegistrySystem {
    pipeline: EntityDataCapture<RegistryService>,
    handle: tokio::task::JoinHandle<()>,
}

impl RegistrySystem {
    /// Starts the store and wires the pipeline.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let config = Arc::new(config);

        let (store, client) = RegistryStore::new(config.store_buffer, config.search_timeout());
        let handle = tokio::spawn(store.run());

        let search: Arc<dyn SearchService> = Arc::new(client.clone());
        let candidates: Vec<Arc<dyn IdGenService>> = vec![
            Arc::new(SequenceIdGenService::new("id")),
            Arc::new(WaterFacilityIdGenService::new(search)),
        ];
        let service = RegistryService::with_generators(config, client, candidates)?;
        info!(
            id_gen = service.id_gen().service_name(),
            "Registry system started"
        );

        Ok(Self {
            pipeline: EntityDataCapture::new(service),
            handle,
        })
    }

    /// Registers identifier formats with the selected generator.
    pub async fn save_id_formats(&self) -> Result<(), RegistryError> {
        self.pipeline.inner().save_id_formats().await
    }

    pub async fn add_entity(&self, root: Value) -> Result<String, RegistryError> {
        self.pipeline.add_entity(root).await
    }

    pub async fn get_entity(&self, entity_type: &str, osid: &str) -> Result<Value, RegistryError> {
        self.pipeline.inner().get_entity(entity_type, osid).await
    }

    pub fn service(&self) -> &RegistryService {
        self.pipeline.inner()
    }

    /// Gracefully shuts down the system.
    ///
    /// Returns an error if the store task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down registry system...");
        drop(self.pipeline);

        if let Err(e) = self.handle.await {
            error!("Store task failed: {:?}", e);
            return Err(format!("Store task failed: {:?}", e));
        }

        info!("Registry system shutdown complete.");
        Ok(())
    }
}
