//! # Registry Framework
//!
//! Building blocks for an entity-creation pipeline whose identifier generators
//! can see the entity they are generating for.
//!
//! ## Architecture Overview
//!
//! 1. **Pipeline** ([`service`]) - [`RegistryService`] validates a creation request, asks an
//!    [`IdGenService`] for identifier values and persists the result.
//! 2. **Bracket** ([`capture`]) - [`EntityDataCapture`] wraps any [`EntityCreator`] so the
//!    request's document is bound in the [`relay`] for exactly the duration of one creation.
//! 3. **Generators** ([`id_gen`]) - the [`IdGenService`] contract, the default
//!    [`SequenceIdGenService`] and the precedence rule [`select_id_gen`].
//! 4. **Persistence** ([`store`], [`client`]) - an in-memory store actor with a uniqueness
//!    constraint on identifier fields; its [`StoreClient`] doubles as the [`SearchService`].
//!
//! ## Concurrency Model
//!
//! - The store runs in its own Tokio task and processes requests sequentially.
//! - Generators run inline on the task performing the creation, which is what
//!   lets them read the task-local relay.
//! - Concurrent creations are isolated by task, not by thread.
//!
//! ## Testing
//!
//! [`mock::MockSearchService`] scripts search responses and errors for
//! generator tests that should not spin up a store.

pub mod capture;
pub mod client;
pub mod config;
pub mod error;
pub mod id_gen;
pub mod message;
pub mod mock;
pub mod payload;
pub mod relay;
pub mod search;
pub mod service;
pub mod store;
pub mod tracing;

// Re-export core types for convenience
pub use capture::{with_entity_data, EntityDataCapture};
pub use client::StoreClient;
pub use config::{ConfigError, EntitySchema, RegistryConfig};
pub use error::{GenerationError, RegistryError};
pub use id_gen::{select_id_gen, ComponentHealthInfo, IdGenService, SequenceIdGenService};
pub use payload::{EntityPayload, GeneratedIdentifier, UniqueIdentifierField};
pub use relay::EntityContext;
pub use search::{Filter, SearchError, SearchQuery, SearchService};
pub use service::{EntityCreator, RegistryService};
pub use store::RegistryStore;
