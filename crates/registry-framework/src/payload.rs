//! # Payload Types
//!
//! Entity documents travel through the pipeline as untyped JSON. This module
//! holds the small set of typed wrappers that sit around them: the identifier
//! field descriptors supplied by schema configuration and the map of values an
//! identifier generator hands back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The document of one entity about to be created.
pub type EntityPayload = Value;

/// Path separator used by identifier field paths (`/wfId`).
pub const PATH_SEPARATOR: char = '/';

/// Descriptor of one field that needs a generated value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueIdentifierField {
    pub field: String,
}

impl UniqueIdentifierField {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }

    /// The configured path without its leading separator.
    pub fn bare_name(&self) -> &str {
        self.field
            .strip_prefix(PATH_SEPARATOR)
            .unwrap_or(&self.field)
    }

    /// True when this descriptor points at `name`, written either bare or
    /// with a single leading separator.
    pub fn matches(&self, name: &str) -> bool {
        self.field == name || self.field.strip_prefix(PATH_SEPARATOR) == Some(name)
    }
}

/// Values produced by an identifier generator, keyed by the exact field path
/// that was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedIdentifier(BTreeMap<String, String>);

impl GeneratedIdentifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.0.insert(path.into(), value.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Reads a value as display text.
///
/// Strings come back verbatim, numbers and booleans in their JSON rendering.
/// Null, containers and missing values read as an empty string.
pub fn as_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Text of a root-level field.
pub fn text_field(payload: &Value, field: &str) -> String {
    as_text(payload.get(field))
}

/// Text of a field nested one level under `parent`.
pub fn nested_text_field(payload: &Value, parent: &str, field: &str) -> String {
    as_text(payload.get(parent).and_then(|p| p.get(field)))
}

/// Looks up a dotted path (`location.county`) in a document.
pub fn lookup_dotted<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |node, segment| node.get(segment))
}

/// Writes `value` at a separator-delimited path, creating intermediate
/// objects. Returns `false` when an intermediate segment is not an object.
pub fn write_path(document: &mut Value, path: &str, value: Value) -> bool {
    let segments: Vec<&str> = path
        .split(PATH_SEPARATOR)
        .filter(|s| !s.is_empty())
        .collect();
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };

    let mut node = document;
    for segment in parents {
        let Some(map) = node.as_object_mut() else {
            return false;
        };
        node = map
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }

    match node.as_object_mut() {
        Some(map) => {
            map.insert((*last).to_string(), value);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_matching_accepts_both_forms() {
        assert!(UniqueIdentifierField::new("wfId").matches("wfId"));
        assert!(UniqueIdentifierField::new("/wfId").matches("wfId"));
        assert!(!UniqueIdentifierField::new("//wfId").matches("wfId"));
        assert!(!UniqueIdentifierField::new("/osid").matches("wfId"));
        assert_eq!(UniqueIdentifierField::new("/wfId").bare_name(), "wfId");
    }

    #[test]
    fn test_text_extraction() {
        let doc = json!({
            "geoCode": "xvksf3s",
            "depth": 12,
            "active": true,
            "nothing": null,
            "location": { "county": "Nimba", "district": null }
        });
        assert_eq!(text_field(&doc, "geoCode"), "xvksf3s");
        assert_eq!(text_field(&doc, "depth"), "12");
        assert_eq!(text_field(&doc, "active"), "true");
        assert_eq!(text_field(&doc, "nothing"), "");
        assert_eq!(text_field(&doc, "missing"), "");
        assert_eq!(text_field(&doc, "location"), "");
        assert_eq!(nested_text_field(&doc, "location", "county"), "Nimba");
        assert_eq!(nested_text_field(&doc, "location", "district"), "");
        assert_eq!(nested_text_field(&doc, "nothing", "county"), "");
    }

    #[test]
    fn test_write_path_creates_parents() {
        let mut doc = json!({ "name": "Well" });
        assert!(write_path(&mut doc, "/wfId", json!("WF-1")));
        assert!(write_path(&mut doc, "/codes/primary", json!("P-1")));
        assert_eq!(doc["wfId"], "WF-1");
        assert_eq!(doc["codes"]["primary"], "P-1");

        assert!(!write_path(&mut doc, "/name/inner", json!("x")));
        assert!(!write_path(&mut doc, "/", json!("x")));
    }

    #[test]
    fn test_lookup_dotted() {
        let doc = json!({ "location": { "county": "Bong" } });
        assert_eq!(lookup_dotted(&doc, "location.county"), Some(&json!("Bong")));
        assert_eq!(lookup_dotted(&doc, "location.district"), None);
    }
}
