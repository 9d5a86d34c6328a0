//! Survey rows and their mapping onto `WaterFacility` documents.

use serde::Deserialize;
use serde_json::{json, Map, Value};

/// One row of the water point mapping export.
///
/// Column names are the export's snake_case headers. Empty cells read as
/// `None`; unknown columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FacilityRow {
    #[serde(default)]
    pub geo_code: String,
    #[serde(default)]
    pub water_point_type: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub community: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub elevation: Option<f64>,
    pub water_point_type_other: Option<String>,
    pub extraction_type: Option<String>,
    pub extraction_type_other: Option<String>,
    pub pump_type: Option<String>,
    pub pump_type_other: Option<String>,
    pub num_taps: Option<f64>,
    pub has_depth_info: Option<String>,
    pub depth_metres: Option<f64>,
    pub installer: Option<String>,
    pub installer_other: Option<String>,
    pub owner: Option<String>,
    pub funder: Option<String>,
    pub photo_url: Option<String>,
}

impl FacilityRow {
    /// The `WaterFacility` document for this row.
    ///
    /// `geoCode` is always text, even when the export holds a number.
    /// Coordinates without a value are left out, and so is `coordinates`
    /// when none has one.
    pub fn to_document(&self) -> Value {
        let mut location = Map::new();
        location.insert("county".into(), json!(self.county));
        location.insert("district".into(), json!(self.district));
        location.insert("community".into(), json!(self.community));

        let mut coordinates = Map::new();
        insert_number(&mut coordinates, "lat", self.lat);
        insert_number(&mut coordinates, "lon", self.lon);
        insert_number(&mut coordinates, "elevation", self.elevation);
        if !coordinates.is_empty() {
            location.insert("coordinates".into(), Value::Object(coordinates));
        }

        let mut document = Map::new();
        document.insert("geoCode".into(), json!(self.geo_code));
        document.insert("waterPointType".into(), json!(self.water_point_type));
        document.insert("location".into(), Value::Object(location));

        insert_text(&mut document, "waterPointTypeOther", &self.water_point_type_other);
        insert_text(&mut document, "extractionType", &self.extraction_type);
        insert_text(&mut document, "extractionTypeOther", &self.extraction_type_other);
        insert_text(&mut document, "pumpType", &self.pump_type);
        insert_text(&mut document, "pumpTypeOther", &self.pump_type_other);
        insert_number(&mut document, "numTaps", self.num_taps);
        if let Some(flag) = &self.has_depth_info {
            document.insert(
                "hasDepthInfo".into(),
                Value::Bool(flag.eq_ignore_ascii_case("yes")),
            );
        }
        insert_number(&mut document, "depthMetres", self.depth_metres);
        insert_text(&mut document, "installer", &self.installer);
        insert_text(&mut document, "installerOther", &self.installer_other);
        insert_text(&mut document, "owner", &self.owner);
        insert_text(&mut document, "funder", &self.funder);
        insert_text(&mut document, "photoUrl", &self.photo_url);

        Value::Object(document)
    }
}

fn insert_number(map: &mut Map<String, Value>, key: &str, value: Option<f64>) {
    // NaN and infinities have no JSON form.
    if let Some(number) = value.and_then(serde_json::Number::from_f64) {
        map.insert(key.to_string(), Value::Number(number));
    }
}

fn insert_text(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(text) = value.as_deref().filter(|t| !t.is_empty()) {
        map.insert(key.to_string(), json!(text));
    }
}
