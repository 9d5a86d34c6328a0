//! # Registry Store Actor
//!
//! This module defines the `RegistryStore`, an in-memory stand-in for the
//! registry's persistence layer. It implements the "Server" side of the actor
//! model: one task owns every stored document and processes requests
//! sequentially, so the store needs no locks.
//!
//! The store enforces a uniqueness constraint on identifier fields. That
//! constraint is the real guarantee behind generated identifiers: a generator's
//! own duplicate check runs before persistence and is not atomic with it.

use crate::client::StoreClient;
use crate::error::RegistryError;
use crate::message::StoreRequest;
use crate::payload::{as_text, lookup_dotted};
use crate::search::{Filter, SearchQuery};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Field the store writes the assigned entity id into.
pub const OSID_FIELD: &str = "osid";

#[derive(Debug, Clone)]
struct StoredEntity {
    osid: String,
    document: Value,
}

/// The actor that owns all persisted entity documents.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `RegistryStore::new()` to get the `store` (server) and `client` (interface).
/// 2.  **Run**: Spawn the store's run loop in a background task.
/// 3.  **Stop**: Drop every client; the loop exits once the channel closes.
///
/// ```rust
/// use registry_framework::store::RegistryStore;
/// use std::time::Duration;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() {
///     let (store, client) = RegistryStore::new(10, Duration::from_secs(1));
///     tokio::spawn(store.run());
///
///     let osid = client
///         .insert("Organisation", json!({ "name": "Akvo" }), Vec::new())
///         .await
///         .unwrap();
///     let doc = client.get("Organisation", &osid).await.unwrap().unwrap();
///     assert_eq!(doc["name"], "Akvo");
/// }
/// ```
pub struct RegistryStore {
    receiver: mpsc::Receiver<StoreRequest>,
    entities: HashMap<String, Vec<StoredEntity>>,
    next_id: u32,
}

impl RegistryStore {
    /// Creates a new `RegistryStore` and its associated `StoreClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    /// * `search_timeout` - Upper bound the client applies to each search call.
    pub fn new(buffer_size: usize, search_timeout: Duration) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let store = Self {
            receiver,
            entities: HashMap::new(),
            next_id: 1,
        };
        (store, StoreClient::new(sender, search_timeout))
    }

    /// Runs the store's event loop, processing messages until the channel closes.
    pub async fn run(mut self) {
        info!("Registry store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Insert {
                    entity_type,
                    document,
                    unique_fields,
                    respond_to,
                } => {
                    debug!(%entity_type, ?document, "Insert");
                    let result = self.insert(&entity_type, document, &unique_fields);
                    match &result {
                        Ok(osid) => info!(%entity_type, %osid, size = self.size(&entity_type), "Created"),
                        Err(e) => warn!(%entity_type, error = %e, "Insert rejected"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Get {
                    entity_type,
                    osid,
                    respond_to,
                } => {
                    let item = self
                        .entities
                        .get(&entity_type)
                        .and_then(|items| items.iter().find(|e| e.osid == osid))
                        .map(|e| e.document.clone());
                    debug!(%entity_type, %osid, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                StoreRequest::Search { query, respond_to } => {
                    debug!(?query, "Search");
                    let _ = respond_to.send(Ok(self.search(&query)));
                }
            }
        }

        info!(entity_types = self.entities.len(), "Registry store shutdown");
    }

    fn size(&self, entity_type: &str) -> usize {
        self.entities.get(entity_type).map_or(0, Vec::len)
    }

    fn insert(
        &mut self,
        entity_type: &str,
        mut document: Value,
        unique_fields: &[String],
    ) -> Result<String, RegistryError> {
        if !document.is_object() {
            return Err(RegistryError::InvalidPayload(format!(
                "{entity_type} document is not an object"
            )));
        }

        let existing = self.entities.entry(entity_type.to_string()).or_default();
        for path in unique_fields {
            let pointer = pointer_path(path);
            let value = match document.pointer(&pointer) {
                Some(Value::Null) | None => continue,
                Some(value) => value,
            };
            if existing
                .iter()
                .any(|e| e.document.pointer(&pointer) == Some(value))
            {
                return Err(RegistryError::UniqueConstraint {
                    field: path.trim_start_matches('/').to_string(),
                    value: as_text(Some(value)),
                });
            }
        }

        let osid = format!("1-{}", self.next_id);
        self.next_id += 1;
        if let Some(fields) = document.as_object_mut() {
            fields.insert(OSID_FIELD.to_string(), Value::String(osid.clone()));
        }
        existing.push(StoredEntity {
            osid: osid.clone(),
            document,
        });
        Ok(osid)
    }

    fn search(&self, query: &SearchQuery) -> Value {
        let mut response = Map::new();
        for entity_type in &query.entity_type {
            let matches: Vec<&Value> = self
                .entities
                .get(entity_type)
                .map(|items| {
                    items
                        .iter()
                        .map(|e| &e.document)
                        .filter(|doc| matches_filters(doc, query))
                        .collect()
                })
                .unwrap_or_default();

            let page: Vec<Value> = matches
                .iter()
                .skip(query.offset)
                .take(query.limit)
                .map(|doc| (*doc).clone())
                .collect();
            response.insert(
                entity_type.clone(),
                json!({ "totalCount": matches.len(), "data": page }),
            );
        }
        Value::Object(response)
    }
}

fn matches_filters(document: &Value, query: &SearchQuery) -> bool {
    query.filters.iter().all(|(field, filter)| match filter {
        Filter::Eq(expected) => lookup_dotted(document, field) == Some(expected),
    })
}

fn pointer_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_store() -> StoreClient {
        let (store, client) = RegistryStore::new(10, Duration::from_secs(1));
        tokio::spawn(store.run());
        client
    }

    #[tokio::test]
    async fn test_insert_assigns_osid() {
        let client = spawn_store();
        let first = client
            .insert("Organisation", json!({ "name": "A" }), Vec::new())
            .await
            .unwrap();
        let second = client
            .insert("Organisation", json!({ "name": "B" }), Vec::new())
            .await
            .unwrap();
        assert_ne!(first, second);

        let doc = client.get("Organisation", &second).await.unwrap().unwrap();
        assert_eq!(doc[OSID_FIELD], second);
        assert!(client.get("Organisation", "1-999").await.unwrap().is_none());
        assert!(client.get("Other", &first).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_constraint() {
        let client = spawn_store();
        let unique = vec!["/wfId".to_string()];
        client
            .insert("WaterFacility", json!({ "wfId": "WF-1" }), unique.clone())
            .await
            .unwrap();

        let err = client
            .insert("WaterFacility", json!({ "wfId": "WF-1" }), unique.clone())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UniqueConstraint { ref field, ref value } if field == "wfId" && value == "WF-1"
        ));

        // Missing values and other types are not constrained.
        client
            .insert("WaterFacility", json!({ "name": "x" }), unique.clone())
            .await
            .unwrap();
        client
            .insert("WaterFacility", json!({ "name": "y" }), unique.clone())
            .await
            .unwrap();
        client
            .insert("Organisation", json!({ "wfId": "WF-1" }), unique)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejects_non_object_document() {
        let client = spawn_store();
        let err = client
            .insert("WaterFacility", json!("nope"), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_search_filters_and_pages() {
        let client = spawn_store();
        for (id, county) in [("WF-1", "Nimba"), ("WF-2", "Nimba"), ("WF-3", "Bong")] {
            client
                .insert(
                    "WaterFacility",
                    json!({ "wfId": id, "location": { "county": county } }),
                    Vec::new(),
                )
                .await
                .unwrap();
        }

        let query = SearchQuery::for_entity("WaterFacility")
            .eq("location.county", "Nimba")
            .limit(1)
            .offset(1);
        let response = client.find(&query).await.unwrap();
        let entry = &response["WaterFacility"];
        assert_eq!(entry["totalCount"], 2);
        assert_eq!(entry["data"].as_array().unwrap().len(), 1);
        assert_eq!(entry["data"][0]["wfId"], "WF-2");

        let none = client
            .find(&SearchQuery::for_entity("WaterFacility").eq("wfId", "WF-9"))
            .await
            .unwrap();
        assert_eq!(none["WaterFacility"]["totalCount"], 0);

        let empty_type = client
            .find(&SearchQuery::for_entity("Organisation"))
            .await
            .unwrap();
        assert_eq!(empty_type["Organisation"]["totalCount"], 0);
    }
}
