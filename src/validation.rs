//! Validation rules applied on the entry mutation paths.
//!
//! Region ids are accepted when they resolve in either catalog, so days
//! recorded before and after the catalog change both validate. Migration does
//! not go through these checks for its source ids; the refined entries it
//! emits satisfy them.

use chrono::NaiveDate;

use crate::pain_model::{BodyPartEntry, PainEntry, PainType};
use crate::region_catalog::resolve_region;

pub fn is_valid_body_part_id(region_id: &str) -> bool {
    resolve_region(region_id).is_some()
}

/// True only for integral values from 1 to 10 inclusive.
pub fn is_valid_intensity_level(level: f64) -> bool {
    level.fract() == 0.0 && (1.0..=10.0).contains(&level)
}

/// `YYYY-MM-DD` that names a real calendar day.
pub fn is_valid_iso_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(position, byte)| position == 4 || position == 7 || byte.is_ascii_digit());

    shaped && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

pub fn is_valid_pain_type(code: &str) -> bool {
    PainType::from_code(code).is_some()
}

pub fn validate_body_part_entry(entry: &BodyPartEntry) -> bool {
    is_valid_body_part_id(&entry.body_part_id)
        && is_valid_intensity_level(f64::from(entry.intensity_level))
}

pub fn validate_pain_entry(entry: &PainEntry) -> bool {
    is_valid_iso_date(&entry.date)
        && entry.body_part_entries.values().all(validate_body_part_entry)
}
