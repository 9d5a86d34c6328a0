//! # IdGenService Trait
//!
//! The `IdGenService` trait is the contract every identifier generator implements
//! to be plugged into the creation pipeline. The pipeline hands it the list of
//! [`UniqueIdentifierField`]s declared by the entity's schema; the generator
//! answers with a value for each field it owns.
//!
//! # Provided Methods
//! - [`IdGenService::save_id_format`] does nothing by default. Generators backed
//!   by an external id service override it to register the field formats.
//! - [`IdGenService::is_primary`] is `false` by default. See [`select_id_gen`].
//!
//! # Entity Data
//! Generators that derive identifiers from the entity itself read it from the
//! [`relay`](crate::relay), which the [`capture`](crate::capture) bracket fills
//! around each creation.

use crate::error::GenerationError;
use crate::payload::{GeneratedIdentifier, UniqueIdentifierField};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Health of one pipeline component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentHealthInfo {
    pub name: String,
    pub healthy: bool,
}

impl ComponentHealthInfo {
    pub fn new(name: impl Into<String>, healthy: bool) -> Self {
        Self {
            name: name.into(),
            healthy,
        }
    }
}

#[async_trait]
pub trait IdGenService: Send + Sync {
    /// Produce values for the requested fields.
    ///
    /// Fields the generator does not own are left out of the result. An empty
    /// result is valid and means "nothing to contribute".
    async fn generate_id(
        &self,
        fields: &[UniqueIdentifierField],
    ) -> Result<GeneratedIdentifier, GenerationError>;

    /// Persist the identifier formats for these fields.
    async fn save_id_format(&self, _fields: &[UniqueIdentifierField]) -> Result<(), GenerationError> {
        Ok(())
    }

    fn service_name(&self) -> &str;

    fn health_info(&self) -> ComponentHealthInfo;

    /// Whether this generator takes precedence when several are configured.
    fn is_primary(&self) -> bool {
        false
    }
}

/// Picks the generator the pipeline should use.
///
/// The first primary candidate wins; without one, the first candidate is used.
pub fn select_id_gen(candidates: Vec<Arc<dyn IdGenService>>) -> Option<Arc<dyn IdGenService>> {
    let primary = candidates.iter().position(|c| c.is_primary());
    let chosen = match primary {
        Some(index) => candidates.into_iter().nth(index),
        None => candidates.into_iter().next(),
    };
    if let Some(service) = &chosen {
        debug!(service = service.service_name(), "Selected identifier generator");
    }
    chosen
}

/// Default generator: numbers every requested field from a shared counter.
pub struct SequenceIdGenService {
    prefix: String,
    counter: AtomicU64,
}

impl SequenceIdGenService {
    pub const SERVICE_NAME: &'static str = "SequenceIdGenService";

    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl IdGenService for SequenceIdGenService {
    async fn generate_id(
        &self,
        fields: &[UniqueIdentifierField],
    ) -> Result<GeneratedIdentifier, GenerationError> {
        let mut result = GeneratedIdentifier::new();
        for field in fields {
            let id = self.counter.fetch_add(1, Ordering::SeqCst);
            result.insert(field.field.clone(), format!("{}-{}", self.prefix, id));
        }
        Ok(result)
    }

    async fn save_id_format(&self, fields: &[UniqueIdentifierField]) -> Result<(), GenerationError> {
        match fields.iter().find(|f| f.bare_name().is_empty()) {
            Some(field) => Err(GenerationError::Configuration(format!(
                "empty identifier field path '{}'",
                field.field
            ))),
            None => Ok(()),
        }
    }

    fn service_name(&self) -> &str {
        Self::SERVICE_NAME
    }

    fn health_info(&self) -> ComponentHealthInfo {
        ComponentHealthInfo::new(Self::SERVICE_NAME, true)
    }
}
