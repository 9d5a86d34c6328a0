//! # Request-Scoped Entity Relay
//!
//! Identifier generators are registered once and shared by every request, so
//! they have no parameter through which the in-flight entity document could
//! reach them. The relay makes that document visible for the duration of one
//! creation operation.
//!
//! Storage is a Tokio task-local, keyed by the logical task rather than the
//! worker thread running it. Two creations interleaved on the same worker each
//! see only their own binding, and a task spawned from inside a scope starts
//! with nothing bound.
//!
//! ```rust
//! use registry_framework::relay;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! relay::scope(async {
//!     relay::set(json!({ "geoCode": "xvksf3s" }), "WaterFacility");
//!     assert_eq!(relay::entity_type().as_deref(), Some("WaterFacility"));
//!     relay::clear();
//!     assert!(relay::current().is_none());
//! })
//! .await;
//! # }
//! ```
//!
//! None of these operations fail. An unset relay is a normal state that
//! readers must handle.

use crate::payload::EntityPayload;
use std::cell::RefCell;
use std::future::Future;
use tracing::{debug, warn};

/// The payload and type name bound for one creation operation.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityContext {
    pub payload: EntityPayload,
    pub entity_type: String,
}

tokio::task_local! {
    static ENTITY_CONTEXT: RefCell<Option<EntityContext>>;
}

/// Runs `fut` with fresh, empty relay storage.
///
/// Whatever `fut` binds is dropped with the scope, including when `fut`
/// panics or is cancelled.
pub async fn scope<F: Future>(fut: F) -> F::Output {
    ENTITY_CONTEXT.scope(RefCell::new(None), fut).await
}

/// Binds `payload` and `entity_type` to the current task, replacing any
/// earlier binding.
pub fn set(payload: EntityPayload, entity_type: impl Into<String>) {
    let entity_type = entity_type.into();
    let bound = ENTITY_CONTEXT
        .try_with(|cell| {
            *cell.borrow_mut() = Some(EntityContext {
                payload,
                entity_type: entity_type.clone(),
            });
        })
        .is_ok();

    if bound {
        debug!(%entity_type, "Entity context bound");
    } else {
        warn!(%entity_type, "No relay scope on this task; entity context not bound");
    }
}

/// The current binding, if any.
pub fn current() -> Option<EntityContext> {
    ENTITY_CONTEXT
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
}

pub fn payload() -> Option<EntityPayload> {
    ENTITY_CONTEXT
        .try_with(|cell| cell.borrow().as_ref().map(|ctx| ctx.payload.clone()))
        .ok()
        .flatten()
}

pub fn entity_type() -> Option<String> {
    ENTITY_CONTEXT
        .try_with(|cell| cell.borrow().as_ref().map(|ctx| ctx.entity_type.clone()))
        .ok()
        .flatten()
}

/// Removes the binding for the current task.
pub fn clear() {
    let _ = ENTITY_CONTEXT.try_with(|cell| cell.borrow_mut().take());
}

/// True when the current task runs inside a relay [`scope`].
pub fn in_scope() -> bool {
    ENTITY_CONTEXT.try_with(|_| ()).is_ok()
}
