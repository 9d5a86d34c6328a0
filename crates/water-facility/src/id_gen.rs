//! # WaterFacility Identifier Generator
//!
//! Derives `wfId` from the facility document itself, so re-submitting the
//! same water point always yields the same identifier:
//!
//! ```text
//! WF-<county>-<district>-<type code>-<hash suffix>
//! WF-NIM-SAN-TWB-DAA7B4
//! ```
//!
//! The document is read from the [`relay`]; the generator only acts when the
//! bound entity type is `WaterFacility`. Before handing out an identifier it asks
//! the search collaborator whether one already exists. A confirmed match
//! rejects the creation. A failed search is logged and ignored, leaving the
//! store's uniqueness constraint to catch a real duplicate.

use crate::model::{FacilityKey, WATER_FACILITY, WF_ID_FIELD};
use async_trait::async_trait;
use registry_framework::id_gen::{ComponentHealthInfo, IdGenService};
use registry_framework::payload::{GeneratedIdentifier, UniqueIdentifierField};
use registry_framework::relay;
use registry_framework::search::{total_count, SearchError, SearchQuery, SearchService};
use registry_framework::GenerationError;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct WaterFacilityIdGenService {
    search: Arc<dyn SearchService>,
}

impl WaterFacilityIdGenService {
    pub const SERVICE_NAME: &'static str = "WaterFacilityIdGenService";

    pub fn new(search: Arc<dyn SearchService>) -> Self {
        Self { search }
    }

    /// Number of existing facilities holding `wf_id`.
    async fn existing_count(&self, wf_id: &str) -> Result<u64, SearchError> {
        let query = SearchQuery::for_entity(WATER_FACILITY)
            .eq(WF_ID_FIELD, wf_id)
            .limit(1)
            .offset(0);
        debug!(%wf_id, "Checking for duplicate wfId");
        let response = self.search.search(&query).await?;
        total_count(&response, WATER_FACILITY)
    }

    /// Fails with [`GenerationError::Duplicate`] when `wf_id` is already taken.
    async fn ensure_unique(&self, wf_id: &str) -> Result<(), GenerationError> {
        match self.existing_count(wf_id).await {
            Ok(0) => Ok(()),
            Ok(count) => {
                error!(%wf_id, count, "Duplicate WaterFacility detected");
                Err(GenerationError::Duplicate {
                    id: wf_id.to_string(),
                    message: duplicate_message(wf_id),
                })
            }
            Err(e) => {
                warn!(%wf_id, error = %e, "Error checking for duplicate wfId; proceeding with creation");
                Ok(())
            }
        }
    }
}

fn duplicate_message(wf_id: &str) -> String {
    format!(
        "Duplicate {WATER_FACILITY}: A water point with {WF_ID_FIELD} '{wf_id}' already exists. \
         Water points with the same geoCode, type, and location are not allowed."
    )
}

#[async_trait]
impl IdGenService for WaterFacilityIdGenService {
    #[instrument(skip_all)]
    async fn generate_id(
        &self,
        fields: &[UniqueIdentifierField],
    ) -> Result<GeneratedIdentifier, GenerationError> {
        let mut result = GeneratedIdentifier::new();

        let Some(context) = relay::current() else {
            debug!("No entity context bound; nothing to generate");
            return Ok(result);
        };
        if context.entity_type != WATER_FACILITY {
            debug!(entity_type = %context.entity_type, "Not a WaterFacility; skipping");
            return Ok(result);
        }

        info!("Generating wfId for WaterFacility entity");
        let key = FacilityKey::from_payload(&context.payload);
        let wf_id = key.wf_id();
        self.ensure_unique(&wf_id).await?;

        match fields.iter().find(|f| f.matches(WF_ID_FIELD)) {
            Some(field) => {
                result.insert(field.field.clone(), wf_id.clone());
                info!(%wf_id, "Generated wfId");
            }
            None => debug!(%wf_id, "No wfId field requested"),
        }
        Ok(result)
    }

    async fn save_id_format(&self, _fields: &[UniqueIdentifierField]) -> Result<(), GenerationError> {
        debug!("save_id_format called; hash-based identifiers need no format");
        Ok(())
    }

    fn service_name(&self) -> &str {
        Self::SERVICE_NAME
    }

    fn health_info(&self) -> ComponentHealthInfo {
        ComponentHealthInfo::new(Self::SERVICE_NAME, true)
    }

    fn is_primary(&self) -> bool {
        true
    }
}
