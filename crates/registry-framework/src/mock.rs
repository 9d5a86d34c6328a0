//! # Mock Search & Testing Guide
//!
//! `MockSearchService` implements [`SearchService`] entirely in memory. Queue up
//! the responses a test needs, hand the mock to the code under test, then check
//! the queries it received.
//!
//! ## When to use the Mock vs the Real Store
//!
//! | Feature | MockSearchService | RegistryStore |
//! |---------|-------------------|---------------|
//! | **Speed** | Instant, no task spawned | Fast, one actor task |
//! | **State** | Scripted responses | Real documents |
//! | **Error Injection** | Easy (`return_err`) | Only "closed" and timeouts |
//! | **Use Case** | Generator logic in isolation | Full creation pipeline |
//!
//! ## Example
//!
//! ```rust
//! use registry_framework::mock::MockSearchService;
//! use registry_framework::search::{SearchError, SearchQuery, SearchService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockSearchService::new();
//!     mock.expect_search()
//!         .return_ok(json!({ "WaterFacility": { "totalCount": 1, "data": [] } }));
//!     mock.expect_search().return_err(SearchError::Timeout);
//!
//!     let query = SearchQuery::for_entity("WaterFacility").limit(1);
//!     assert!(mock.search(&query).await.is_ok());
//!     assert_eq!(mock.search(&query).await, Err(SearchError::Timeout));
//!
//!     assert_eq!(mock.queries().len(), 2);
//!     mock.verify();
//! }
//! ```
//!
//! A search arriving with no queued expectation panics, so a test fails loudly
//! when the code under test calls search when it should not have.

use crate::search::{SearchError, SearchQuery, SearchService};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Expectation = Result<Value, SearchError>;

/// A search collaborator with expectation tracking for fluent testing.
#[derive(Clone, Default)]
pub struct MockSearchService {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    received: Arc<Mutex<Vec<SearchQuery>>>,
}

impl MockSearchService {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects one more `search` call.
    pub fn expect_search(&self) -> SearchExpectationBuilder {
        SearchExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Every query received so far, in order.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.received.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

#[async_trait]
impl SearchService for MockSearchService {
    async fn search(&self, query: &SearchQuery) -> Result<Value, SearchError> {
        self.received.lock().unwrap().push(query.clone());
        let next = self.expectations.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => panic!("Unexpected search: {query:?}"),
        }
    }
}

/// Builder for `search` expectations.
pub struct SearchExpectationBuilder {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl SearchExpectationBuilder {
    /// Sets the expectation to return a successful response.
    pub fn return_ok(self, response: Value) {
        self.expectations.lock().unwrap().push_back(Ok(response));
    }

    /// Shorthand for a response reporting `total_count` matches of `entity_type`.
    pub fn return_count(self, entity_type: &str, total_count: u64) {
        let mut response = serde_json::Map::new();
        response.insert(
            entity_type.to_string(),
            serde_json::json!({ "totalCount": total_count, "data": [] }),
        );
        self.return_ok(Value::Object(response));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: SearchError) {
        self.expectations.lock().unwrap().push_back(Err(error));
    }
}
