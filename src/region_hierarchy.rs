//! Helpers over the refined 60-region hierarchy.
//!
//! Identifier parsing lives on [`RegionHierarchy`]; the free functions here
//! add the table-driven lookups (subdivisions, variants, views, display data)
//! the rest of the crate and the host UI need.

use std::collections::BTreeSet;

use crate::body_region::{BodyPartCategory, RegionHierarchy, Side, View};
use crate::region_catalog::refined_catalog;

/// Primary regions in display order, each with its two subdivisions.
static REGION_SUBDIVISIONS: &[(&str, [&str; 2])] = &[
    ("neck", ["anterior", "posterior"]),
    ("shoulder", ["superior", "inferior"]),
    ("arm", ["proximal", "distal"]),
    ("forearm", ["anterolateral", "posterolateral"]),
    ("hand", ["palma", "dorso"]),
    ("dorsal", ["superior", "inferior"]),
    ("lumbar", ["superior", "inferior"]),
    ("sacroiliac", ["superior", "inferior"]),
    ("gluteal", ["superior", "inferior"]),
    ("groin", ["medial", "lateral"]),
    ("thigh", ["anterior", "posterior"]),
    ("knee", ["lateral", "medial"]),
    ("shin", ["anterior", "posterior"]),
    ("ankle", ["anterolateral", "posterolateral"]),
    ("foot", ["dorso", "planta"]),
];

/// `"shoulder_left_superior"` → `shoulder / left / superior`.
pub fn parse_region_id(region_id: &str) -> Option<RegionHierarchy> {
    RegionHierarchy::parse(region_id)
}

pub fn generate_region_id(hierarchy: &RegionHierarchy) -> String {
    hierarchy.to_region_id()
}

/// Ordered subdivisions of a primary region; empty for unknown regions.
pub fn subdivisions_for_region(primary_region: &str) -> &'static [&'static str] {
    REGION_SUBDIVISIONS
        .iter()
        .find(|(name, _)| *name == primary_region)
        .map(|(_, subdivisions)| subdivisions.as_slice())
        .unwrap_or(&[])
}

pub fn primary_region_from_id(region_id: &str) -> Option<String> {
    parse_region_id(region_id).map(|hierarchy| hierarchy.primary_region)
}

/// `("shoulder", Left)` → `["shoulder_left_superior", "shoulder_left_inferior"]`.
pub fn region_variants_for_side(primary_region: &str, side: Side) -> Vec<String> {
    subdivisions_for_region(primary_region)
        .iter()
        .map(|subdivision| RegionHierarchy::new(primary_region, side, *subdivision).to_region_id())
        .collect()
}

/// Left variants followed by right variants.
pub fn all_region_variants(primary_region: &str) -> Vec<String> {
    let mut variants = region_variants_for_side(primary_region, Side::Left);
    variants.extend(region_variants_for_side(primary_region, Side::Right));
    variants
}

pub fn all_primary_regions() -> Vec<&'static str> {
    REGION_SUBDIVISIONS.iter().map(|(name, _)| *name).collect()
}

/// Display name from the refined catalog, or the identifier itself when unknown.
pub fn region_display_name(region_id: &str) -> String {
    refined_catalog()
        .get(region_id)
        .map(|part| part.anatomical_name.to_string())
        .unwrap_or_else(|| region_id.to_string())
}

pub fn region_abbreviation(region_id: &str) -> String {
    refined_catalog()
        .get(region_id)
        .and_then(|part| part.abbreviation)
        .map(str::to_string)
        .unwrap_or_else(|| region_id.to_string())
}

pub fn region_category(region_id: &str) -> Option<BodyPartCategory> {
    refined_catalog().get(region_id).map(|part| part.category)
}

pub fn is_valid_region_id(region_id: &str) -> bool {
    refined_catalog().contains(region_id)
}

pub fn regions_for_view(view: View) -> Vec<&'static str> {
    refined_catalog().diagram(view)
}

/// Primary regions with at least one region drawn on `view`, sorted by name.
pub fn primary_regions_for_view(view: View) -> Vec<String> {
    regions_for_view(view)
        .into_iter()
        .filter_map(primary_region_from_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Gluteal regions are only reachable from the back diagram.
pub fn is_back_view_only(primary_region: &str) -> bool {
    primary_region == "gluteal"
}

/// Groin regions are only reachable from the front diagram.
pub fn is_front_view_only(primary_region: &str) -> bool {
    primary_region == "groin"
}
