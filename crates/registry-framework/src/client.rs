//! # Store Client
//!
//! This module defines the client for communicating with the
//! [`RegistryStore`](crate::store::RegistryStore) actor.

use crate::error::RegistryError;
use crate::message::StoreRequest;
use crate::search::{SearchError, SearchQuery, SearchService};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// A typed, async API over the store's request channel.
///
/// * **Cloneable** – holds only a sender, so cloning is inexpensive.
/// * **Search collaborator** – implements [`SearchService`], bounding each call
///   by the timeout given at construction.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
    search_timeout: Duration,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>, search_timeout: Duration) -> Self {
        Self {
            sender,
            search_timeout,
        }
    }

    pub async fn insert(
        &self,
        entity_type: impl Into<String>,
        document: Value,
        unique_fields: Vec<String>,
    ) -> Result<String, RegistryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Insert {
                entity_type: entity_type.into(),
                document,
                unique_fields,
                respond_to,
            })
            .await
            .map_err(|_| RegistryError::StoreClosed)?;
        response.await.map_err(|_| RegistryError::StoreDropped)?
    }

    pub async fn get(
        &self,
        entity_type: impl Into<String>,
        osid: &str,
    ) -> Result<Option<Value>, RegistryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Get {
                entity_type: entity_type.into(),
                osid: osid.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| RegistryError::StoreClosed)?;
        response.await.map_err(|_| RegistryError::StoreDropped)?
    }

    /// Runs a search without the timeout applied by [`SearchService::search`].
    pub async fn find(&self, query: &SearchQuery) -> Result<Value, RegistryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Search {
                query: query.clone(),
                respond_to,
            })
            .await
            .map_err(|_| RegistryError::StoreClosed)?;
        response.await.map_err(|_| RegistryError::StoreDropped)?
    }
}

#[async_trait]
impl SearchService for StoreClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &SearchQuery) -> Result<Value, SearchError> {
        debug!("Sending search to store");
        match tokio::time::timeout(self.search_timeout, self.find(query)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(SearchError::Unavailable(e.to_string())),
            Err(_) => Err(SearchError::Timeout),
        }
    }
}
