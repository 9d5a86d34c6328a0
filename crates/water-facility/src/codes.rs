//! Short codes that make up the readable part of a facility identifier.

/// Placeholder for a location name or point type that yields no code.
pub const UNKNOWN_CODE: &str = "UNK";

/// Maximum length of a location abbreviation.
pub const ABBREVIATION_LEN: usize = 3;

/// Known water point categories and their codes. Matching is exact.
pub const WATER_POINT_TYPE_CODES: [(&str, &str); 11] = [
    ("Protected dug well", "PDW"),
    ("Unprotected dug well", "UDW"),
    ("Tube well or borehole", "TWB"),
    ("Protected spring", "PS"),
    ("Unprotected spring", "US"),
    ("Piped water into dwelling/plot/yard", "PWD"),
    ("Public tap/standpipe", "PTS"),
    ("Unequipped borehole", "UEB"),
    ("Rainwater (harvesting)", "RWH"),
    ("Sand/Sub-surface dam (with well or standpipe)", "SSD"),
    ("Other", "OTH"),
];

/// Code for a water point type, or [`UNKNOWN_CODE`] when the category is not listed.
pub fn type_code(water_point_type: &str) -> &'static str {
    WATER_POINT_TYPE_CODES
        .iter()
        .find(|(name, _)| *name == water_point_type)
        .map_or(UNKNOWN_CODE, |(_, code)| *code)
}

/// Uppercased first three ASCII alphanumerics of `name`.
///
/// Shorter names give shorter abbreviations. A name with no alphanumerics
/// at all gives [`UNKNOWN_CODE`].
pub fn abbreviate(name: &str) -> String {
    let abbreviation: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(ABBREVIATION_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if abbreviation.is_empty() {
        UNKNOWN_CODE.to_string()
    } else {
        abbreviation
    }
}
