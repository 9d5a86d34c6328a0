//! # Search Collaborator
//!
//! The narrow search contract the pipeline depends on: a structured filter query
//! in, a JSON document keyed by entity type out.
//!
//! ```json
//! { "entityType": ["WaterFacility"], "filters": { "wfId": { "eq": "WF-..." } }, "limit": 1, "offset": 0 }
//! ```
//!
//! answers with
//!
//! ```json
//! { "WaterFacility": { "totalCount": 1, "data": [ { ... } ] } }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single field condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    Eq(Value),
}

/// Structured filter query understood by a [`SearchService`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub entity_type: Vec<String>,
    #[serde(default)]
    pub filters: BTreeMap<String, Filter>,
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl SearchQuery {
    pub const DEFAULT_LIMIT: usize = 100;

    /// Query over a single entity type with no filters.
    pub fn for_entity(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: vec![entity_type.into()],
            filters: BTreeMap::new(),
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), Filter::Eq(value.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Infrastructural failures of a search call.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search service unavailable: {0}")]
    Unavailable(String),
    #[error("Search timed out")]
    Timeout,
    #[error("Malformed search response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Value, SearchError>;
}

/// Reads `totalCount` for `entity_type` out of a search response.
///
/// A response without an entry for the type counts as zero matches.
pub fn total_count(response: &Value, entity_type: &str) -> Result<u64, SearchError> {
    let Some(entry) = response.get(entity_type) else {
        return Ok(0);
    };
    match entry.get("totalCount") {
        None | Some(Value::Null) => Ok(0),
        Some(count) => count.as_u64().ok_or_else(|| {
            SearchError::Malformed(format!("totalCount for {entity_type} is {count}"))
        }),
    }
}
