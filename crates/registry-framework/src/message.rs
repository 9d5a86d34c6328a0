//! # Store Messages
//!
//! This module defines the message types used for communication between the
//! [`StoreClient`](crate::client::StoreClient) and the
//! [`RegistryStore`](crate::store::RegistryStore) actor.

use crate::error::RegistryError;
use crate::search::SearchQuery;
use serde_json::Value;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, RegistryError>>;

/// Request sent to the store actor.
///
/// The store only knows three operations: persist a new document, read one
/// back by `osid`, and answer a structured search.
#[derive(Debug)]
pub enum StoreRequest {
    Insert {
        entity_type: String,
        document: Value,
        /// Field paths (`/wfId`) whose values must be unique within the type.
        unique_fields: Vec<String>,
        respond_to: Response<String>,
    },
    Get {
        entity_type: String,
        osid: String,
        respond_to: Response<Option<Value>>,
    },
    Search {
        query: SearchQuery,
        respond_to: Response<Value>,
    },
}
