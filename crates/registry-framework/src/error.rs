//! # Framework Errors
//!
//! This module defines the common error types used throughout the registry pipeline.
//! Each collaborator gets its own enum so callers can match on the failure that
//! actually happened, and the pipeline error wraps the others with `#[from]`.

use crate::config::ConfigError;

/// Errors raised while generating identifiers.
///
/// Only two conditions are fatal for an identifier generator: a confirmed
/// duplicate, and a request that the generator cannot satisfy because of how
/// it was configured. Everything else degrades to an empty result.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum GenerationError {
    /// An entity with the generated identifier already exists.
    #[error("{message}")]
    Duplicate { id: String, message: String },

    #[error("Identifier configuration error: {0}")]
    Configuration(String),
}

/// Errors that can occur while creating or reading registry entities.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Registry store closed")]
    StoreClosed,
    #[error("Registry store dropped response channel")]
    StoreDropped,
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    /// The persistence-side backstop for identifiers that slipped past the
    /// generator's duplicate check.
    #[error("Unique constraint violated: {field} = '{value}' already exists")]
    UniqueConstraint { field: String, value: String },
    #[error("No identifier generator configured")]
    NoIdGenerator,
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
