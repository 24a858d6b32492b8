//! Legacy → refined region correspondence.
//!
//! Single source of truth for migration. Every legacy identifier maps to an
//! ordered list of one to four refined identifiers. A legacy region that
//! covered a whole refined primary region lists all of that side's
//! subdivisions; legacy regions that historically named one part of a
//! primary region (`deltoid`, `bicep`, `tricep`) map only to the subdivision
//! they represented.
//!
//! The table covers every identifier of the legacy catalog, plus the
//! `sacroiliac` and `groin` identifiers that older builds also wrote.

use std::collections::HashMap;
use std::sync::LazyLock;

static LEGACY_TO_REFINED: &[(&str, &[&str])] = &[
    ("left_neck", &["neck_left_anterior", "neck_left_posterior"]),
    ("right_neck", &["neck_right_anterior", "neck_right_posterior"]),
    ("left_shoulder", &["shoulder_left_superior", "shoulder_left_inferior"]),
    ("right_shoulder", &["shoulder_right_superior", "shoulder_right_inferior"]),
    ("left_deltoid", &["shoulder_left_superior"]),
    ("right_deltoid", &["shoulder_right_superior"]),
    // bicep and tricep both land on the proximal arm
    ("left_bicep", &["arm_left_proximal"]),
    ("right_bicep", &["arm_right_proximal"]),
    ("left_tricep", &["arm_left_proximal"]),
    ("right_tricep", &["arm_right_proximal"]),
    ("left_forearm", &["forearm_left_anterolateral", "forearm_left_posterolateral"]),
    ("right_forearm", &["forearm_right_anterolateral", "forearm_right_posterolateral"]),
    ("left_hand", &["hand_left_palma", "hand_left_dorso"]),
    ("right_hand", &["hand_right_palma", "hand_right_dorso"]),
    ("left_upper_back", &["dorsal_left_superior", "dorsal_left_inferior"]),
    ("right_upper_back", &["dorsal_right_superior", "dorsal_right_inferior"]),
    ("left_lower_back", &["lumbar_left_superior", "lumbar_left_inferior"]),
    ("right_lower_back", &["lumbar_right_superior", "lumbar_right_inferior"]),
    ("left_sacroiliac", &["sacroiliac_left_superior", "sacroiliac_left_inferior"]),
    ("right_sacroiliac", &["sacroiliac_right_superior", "sacroiliac_right_inferior"]),
    ("left_gluteal", &["gluteal_left_superior", "gluteal_left_inferior"]),
    ("right_gluteal", &["gluteal_right_superior", "gluteal_right_inferior"]),
    ("left_groin", &["groin_left_medial", "groin_left_lateral"]),
    ("right_groin", &["groin_right_medial", "groin_right_lateral"]),
    ("left_thigh", &["thigh_left_anterior", "thigh_left_posterior"]),
    ("right_thigh", &["thigh_right_anterior", "thigh_right_posterior"]),
    ("left_knee", &["knee_left_lateral", "knee_left_medial"]),
    ("right_knee", &["knee_right_lateral", "knee_right_medial"]),
    ("left_shin", &["shin_left_anterior", "shin_left_posterior"]),
    ("right_shin", &["shin_right_anterior", "shin_right_posterior"]),
    ("left_ankle", &["ankle_left_anterolateral", "ankle_left_posterolateral"]),
    ("right_ankle", &["ankle_right_anterolateral", "ankle_right_posterolateral"]),
    ("left_foot", &["foot_left_dorso", "foot_left_planta"]),
    ("right_foot", &["foot_right_dorso", "foot_right_planta"]),
];

static MAPPING_INDEX: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| LEGACY_TO_REFINED.iter().copied().collect());

/// Refined identifiers a legacy identifier fans out to, in table order.
pub fn refined_targets(legacy_id: &str) -> Option<&'static [&'static str]> {
    MAPPING_INDEX.get(legacy_id).copied()
}

pub fn is_mapped_legacy_id(region_id: &str) -> bool {
    MAPPING_INDEX.contains_key(region_id)
}

/// All mapped legacy identifiers, in table order.
pub fn legacy_region_ids() -> impl Iterator<Item = &'static str> {
    LEGACY_TO_REFINED.iter().map(|(legacy_id, _)| *legacy_id)
}

/// Legacy identifiers whose data migrates into `refined_id`.
///
/// `shoulder_left_superior` yields `["left_shoulder", "left_deltoid"]`.
pub fn legacy_sources_for(refined_id: &str) -> Vec<&'static str> {
    LEGACY_TO_REFINED
        .iter()
        .filter(|(_, targets)| targets.contains(&refined_id))
        .map(|(legacy_id, _)| *legacy_id)
        .collect()
}
