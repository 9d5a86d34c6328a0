//! The identifying attributes of a water facility.

use crate::codes::{abbreviate, type_code};
use crate::hash::hash_suffix;
use registry_framework::payload::{nested_text_field, text_field};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entity type owned by the facility generator.
pub const WATER_FACILITY: &str = "WaterFacility";

/// Identifier field written by the facility generator.
pub const WF_ID_FIELD: &str = "wfId";

/// Literal prefix of every facility identifier.
pub const WF_ID_PREFIX: &str = "WF";

/// The five values that identify a real-world water point.
///
/// Two facilities whose values normalize to the same five strings are the
/// same facility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityKey {
    pub geo_code: String,
    pub water_point_type: String,
    pub county: String,
    pub district: String,
    pub community: String,
}

impl FacilityKey {
    /// Reads the key out of a `WaterFacility` document. Missing or null
    /// fields are empty strings.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            geo_code: text_field(payload, "geoCode"),
            water_point_type: text_field(payload, "waterPointType"),
            county: nested_text_field(payload, "location", "county"),
            district: nested_text_field(payload, "location", "district"),
            community: nested_text_field(payload, "location", "community"),
        }
    }

    fn hashed_values(&self) -> [&str; 5] {
        [
            self.geo_code.as_str(),
            self.water_point_type.as_str(),
            self.county.as_str(),
            self.district.as_str(),
            self.community.as_str(),
        ]
    }

    /// `WF-<county>-<district>-<type>-<hash>`.
    pub fn wf_id(&self) -> String {
        format!(
            "{WF_ID_PREFIX}-{}-{}-{}-{}",
            abbreviate(&self.county),
            abbreviate(&self.district),
            type_code(&self.water_point_type),
            hash_suffix(&self.hashed_values()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_payload() {
        let key = FacilityKey::from_payload(&json!({
            "geoCode": "xvksf3s",
            "waterPointType": "Tube well or borehole",
            "location": { "county": "Nimba", "district": null }
        }));
        assert_eq!(key.geo_code, "xvksf3s");
        assert_eq!(key.county, "Nimba");
        assert_eq!(key.district, "");
        assert_eq!(key.community, "");
    }

    #[test]
    fn test_non_string_values_render_as_text() {
        let key = FacilityKey::from_payload(&json!({ "geoCode": 1234, "location": "flat" }));
        assert_eq!(key.geo_code, "1234");
        assert_eq!(key.county, "");
    }

    #[test]
    fn test_wf_id() {
        let key = FacilityKey {
            geo_code: "xvksf3s".into(),
            water_point_type: "Tube well or borehole".into(),
            county: "Nimba".into(),
            district: "Sanniquellie Mahn".into(),
            community: "Kpaytuo Town".into(),
        };
        assert_eq!(key.wf_id(), "WF-NIM-SAN-TWB-DAA7B4");
        assert_eq!(FacilityKey::default().wf_id(), "WF-UNK-UNK-UNK-45CA31");
    }
}
