//! # Entity Data Capture
//!
//! Brackets a creation operation with the [`relay`](crate::relay): the entity
//! document is bound before the creation logic runs and cleared after it,
//! whichever way it finishes.
//!
//! Clearing is owned by the bracket, never by the generator. A drop guard runs
//! it on success, on error, on panic unwind and when the creation future is
//! cancelled mid-flight.

use crate::error::RegistryError;
use crate::payload::EntityPayload;
use crate::relay;
use crate::service::EntityCreator;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, instrument};

/// Splits a root creation request into its entity type and document.
///
/// The entity type is the first key of the root object, in document order.
pub fn extract_root(root: &Value) -> Option<(String, EntityPayload)> {
    let (entity_type, document) = root.as_object()?.iter().next()?;
    Some((entity_type.clone(), document.clone()))
}

struct ClearOnDrop;

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        relay::clear();
        debug!("Cleared entity context");
    }
}

/// Runs `fut` with the entity carried by `root` bound in the relay.
///
/// A root that carries no entity runs with nothing bound.
pub async fn with_entity_data<F: Future>(root: &Value, fut: F) -> F::Output {
    relay::scope(bracket(extract_root(root), fut)).await
}

/// Binds `captured` in the enclosing relay scope, runs `fut`, then clears.
async fn bracket<F: Future>(captured: Option<(String, EntityPayload)>, fut: F) -> F::Output {
    let _guard = ClearOnDrop;
    match captured {
        Some((entity_type, payload)) => {
            debug!(%entity_type, "Capturing entity data");
            relay::set(payload, entity_type);
        }
        None => debug!("Creation request carries no entity; nothing captured"),
    }
    fut.await
}

/// Decorator that runs every `add_entity` of the wrapped creator inside
/// [`with_entity_data`].
#[derive(Clone)]
pub struct EntityDataCapture<C> {
    inner: C,
}

impl<C: EntityCreator> EntityDataCapture<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: EntityCreator> EntityCreator for EntityDataCapture<C> {
    #[instrument(skip(self, root))]
    async fn add_entity(&self, root: Value) -> Result<String, RegistryError> {
        let request = root.clone();
        with_entity_data(&request, self.inner.add_entity(root)).await
    }
}
