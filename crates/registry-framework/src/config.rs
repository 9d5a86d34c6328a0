//! # Registry Configuration
//!
//! Schema and runtime settings for the creation pipeline, loaded from JSON.
//! Every field has a default, so an empty document is a valid configuration.
//!
//! ```json
//! {
//!   "storeBuffer": 32,
//!   "searchTimeoutMs": 2000,
//!   "schemas": [
//!     { "name": "WaterFacility", "uniqueIdentifierFields": [ { "field": "/wfId" } ] }
//!   ]
//! }
//! ```

use crate::payload::UniqueIdentifierField;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate schema for entity type {0}")]
    DuplicateSchema(String),
}

/// Schema declaration for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySchema {
    pub name: String,
    #[serde(default)]
    pub unique_identifier_fields: Vec<UniqueIdentifierField>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique_identifier_fields: Vec::new(),
        }
    }

    pub fn with_identifier(mut self, field: impl Into<String>) -> Self {
        self.unique_identifier_fields
            .push(UniqueIdentifierField::new(field));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryConfig {
    /// Capacity of the store actor's request channel.
    pub store_buffer: usize,
    /// Upper bound on one search call made through the store client.
    pub search_timeout_ms: u64,
    pub schemas: Vec<EntitySchema>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            store_buffer: 32,
            search_timeout_ms: 2000,
            schemas: Vec::new(),
        }
    }
}

impl RegistryConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn with_schema(mut self, schema: EntitySchema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn schema(&self, entity_type: &str) -> Option<&EntitySchema> {
        self.schemas.iter().find(|s| s.name == entity_type)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (index, schema) in self.schemas.iter().enumerate() {
            if self.schemas[..index].iter().any(|s| s.name == schema.name) {
                return Err(ConfigError::DuplicateSchema(schema.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RegistryConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.search_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_parse_schemas() {
        let config = RegistryConfig::from_json_str(
            r#"{
                "searchTimeoutMs": 250,
                "schemas": [
                    { "name": "WaterFacility", "uniqueIdentifierFields": [ { "field": "/wfId" } ] },
                    { "name": "Organisation" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.store_buffer, 32);
        assert_eq!(config.search_timeout_ms, 250);
        let schema = config.schema("WaterFacility").unwrap();
        assert_eq!(
            schema.unique_identifier_fields,
            vec![UniqueIdentifierField::new("/wfId")]
        );
        assert!(config
            .schema("Organisation")
            .unwrap()
            .unique_identifier_fields
            .is_empty());
        assert!(config.schema("Unknown").is_none());
    }

    #[test]
    fn test_duplicate_schema_rejected() {
        let err = RegistryConfig::from_json_str(
            r#"{ "schemas": [ { "name": "A" }, { "name": "A" } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSchema(name) if name == "A"));
    }

    #[test]
    fn test_missing_file() {
        let err = RegistryConfig::from_path("/nonexistent/registry.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
