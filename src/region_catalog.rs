//! Static region catalogs.
//!
//! Two generations of body-region identifiers coexist in persisted data:
//!
//! - the **legacy** catalog: 30 sided regions keyed `{side}_{region}`
//!   (`left_shoulder`, `right_upper_back`, ...), drawn as one shape per region;
//! - the **refined** catalog: 60 regions keyed
//!   `{primaryRegion}_{side}_{subdivision}` (`shoulder_left_superior`), 15
//!   primary regions with two subdivisions on each side.
//!
//! Both are immutable tables. Lookups return `Option` and never panic on
//! unknown identifiers.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::body_region::{BodyPartCategory, Laterality, RegionDefinition, Side, View};

/// Which catalog generation a region identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionSystem {
    Legacy,
    Refined,
}

/// An indexed, read-only set of region definitions.
#[derive(Debug)]
pub struct RegionCatalog {
    version: &'static str,
    parts: &'static [RegionDefinition],
    index: HashMap<&'static str, usize>,
}

impl RegionCatalog {
    fn build(version: &'static str, parts: &'static [RegionDefinition]) -> Self {
        let index = parts
            .iter()
            .enumerate()
            .map(|(position, part)| (part.id, position))
            .collect();

        Self { version, parts, index }
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn get(&self, region_id: &str) -> Option<&'static RegionDefinition> {
        let parts = self.parts;
        self.index.get(region_id).map(|&position| &parts[position])
    }

    pub fn contains(&self, region_id: &str) -> bool {
        self.index.contains_key(region_id)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Definitions in declaration order.
    pub fn parts(&self) -> &'static [RegionDefinition] {
        self.parts
    }

    /// Identifiers drawn on the given view, in declaration order.
    pub fn diagram(&self, view: View) -> Vec<&'static str> {
        self.parts
            .iter()
            .filter(|part| part.view == view)
            .map(|part| part.id)
            .collect()
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<BodyPartCategory> {
        let mut categories = Vec::new();
        for part in self.parts {
            if !categories.contains(&part.category) {
                categories.push(part.category);
            }
        }
        categories
    }
}

const fn part(
    id: &'static str,
    anatomical_name: &'static str,
    abbreviation: &'static str,
    view: View,
    side: Side,
    category: BodyPartCategory,
) -> RegionDefinition {
    let side = match side {
        Side::Left => Laterality::Left,
        Side::Right => Laterality::Right,
    };

    RegionDefinition {
        id,
        anatomical_name,
        abbreviation: Some(abbreviation),
        view,
        side: Some(side),
        category,
    }
}

static LEGACY_PARTS: [RegionDefinition; 30] = [
    part("left_neck", "Cuello Izquierdo", "Cu.Izq", View::Front, Side::Left, BodyPartCategory::Neck),
    part("right_neck", "Cuello Derecho", "Cu.Der", View::Front, Side::Right, BodyPartCategory::Neck),
    part("left_shoulder", "Hombro Izquierdo", "Ho.Izq", View::Front, Side::Left, BodyPartCategory::Shoulders),
    part("right_shoulder", "Hombro Derecho", "Ho.Der", View::Front, Side::Right, BodyPartCategory::Shoulders),
    part("left_deltoid", "Deltoides Izquierdo", "De.Izq", View::Front, Side::Left, BodyPartCategory::Shoulders),
    part("right_deltoid", "Deltoides Derecho", "De.Der", View::Front, Side::Right, BodyPartCategory::Shoulders),
    part("left_bicep", "Bíceps Izquierdo", "Bi.Izq", View::Front, Side::Left, BodyPartCategory::Arms),
    part("right_bicep", "Bíceps Derecho", "Bi.Der", View::Front, Side::Right, BodyPartCategory::Arms),
    part("left_tricep", "Tríceps Izquierdo", "Tr.Izq", View::Back, Side::Left, BodyPartCategory::Arms),
    part("right_tricep", "Tríceps Derecho", "Tr.Der", View::Back, Side::Right, BodyPartCategory::Arms),
    part("left_forearm", "Antebrazo Izquierdo", "An.Izq", View::Front, Side::Left, BodyPartCategory::Forearms),
    part("right_forearm", "Antebrazo Derecho", "An.Der", View::Front, Side::Right, BodyPartCategory::Forearms),
    part("left_hand", "Mano Izquierda", "Ma.Izq", View::Front, Side::Left, BodyPartCategory::Hands),
    part("right_hand", "Mano Derecha", "Ma.Der", View::Front, Side::Right, BodyPartCategory::Hands),
    part("left_upper_back", "Espalda Alta Izquierda", "EA.Izq", View::Back, Side::Left, BodyPartCategory::Back),
    part("right_upper_back", "Espalda Alta Derecha", "EA.Der", View::Back, Side::Right, BodyPartCategory::Back),
    part("left_lower_back", "Espalda Baja Izquierda", "EB.Izq", View::Back, Side::Left, BodyPartCategory::LowerBack),
    part("right_lower_back", "Espalda Baja Derecha", "EB.Der", View::Back, Side::Right, BodyPartCategory::LowerBack),
    part("left_gluteal", "Glúteo Izquierdo", "Gl.Izq", View::Back, Side::Left, BodyPartCategory::Pelvis),
    part("right_gluteal", "Glúteo Derecho", "Gl.Der", View::Back, Side::Right, BodyPartCategory::Pelvis),
    part("left_thigh", "Muslo Izquierdo", "Mu.Izq", View::Front, Side::Left, BodyPartCategory::Thighs),
    part("right_thigh", "Muslo Derecho", "Mu.Der", View::Front, Side::Right, BodyPartCategory::Thighs),
    part("left_knee", "Rodilla Izquierda", "Ro.Izq", View::Front, Side::Left, BodyPartCategory::Knees),
    part("right_knee", "Rodilla Derecha", "Ro.Der", View::Front, Side::Right, BodyPartCategory::Knees),
    part("left_shin", "Canilla Izquierda", "Ca.Izq", View::Front, Side::Left, BodyPartCategory::Shins),
    part("right_shin", "Canilla Derecha", "Ca.Der", View::Front, Side::Right, BodyPartCategory::Shins),
    part("left_ankle", "Tobillo Izquierdo", "To.Izq", View::Front, Side::Left, BodyPartCategory::Feet),
    part("right_ankle", "Tobillo Derecho", "To.Der", View::Front, Side::Right, BodyPartCategory::Feet),
    part("left_foot", "Pie Izquierdo", "Pi.Izq", View::Front, Side::Left, BodyPartCategory::Feet),
    part("right_foot", "Pie Derecho", "Pi.Der", View::Front, Side::Right, BodyPartCategory::Feet),
];

static REFINED_PARTS: [RegionDefinition; 60] = [
    part("neck_left_anterior", "Cuello Izquierdo - Anterior", "Cu.Izq.A", View::Front, Side::Left, BodyPartCategory::Neck),
    part("neck_left_posterior", "Cuello Izquierdo - Posterior", "Cu.Izq.P", View::Back, Side::Left, BodyPartCategory::Neck),
    part("neck_right_anterior", "Cuello Derecho - Anterior", "Cu.Der.A", View::Front, Side::Right, BodyPartCategory::Neck),
    part("neck_right_posterior", "Cuello Derecho - Posterior", "Cu.Der.P", View::Back, Side::Right, BodyPartCategory::Neck),
    part("shoulder_left_superior", "Hombro Izquierdo - Superior", "Ho.Izq.S", View::Front, Side::Left, BodyPartCategory::Shoulders),
    part("shoulder_left_inferior", "Hombro Izquierdo - Inferior", "Ho.Izq.I", View::Front, Side::Left, BodyPartCategory::Shoulders),
    part("shoulder_right_superior", "Hombro Derecho - Superior", "Ho.Der.S", View::Front, Side::Right, BodyPartCategory::Shoulders),
    part("shoulder_right_inferior", "Hombro Derecho - Inferior", "Ho.Der.I", View::Front, Side::Right, BodyPartCategory::Shoulders),
    part("arm_left_proximal", "Brazo Izquierdo - Proximal", "Br.Izq.P", View::Front, Side::Left, BodyPartCategory::Arms),
    part("arm_left_distal", "Brazo Izquierdo - Distal", "Br.Izq.D", View::Front, Side::Left, BodyPartCategory::Arms),
    part("arm_right_proximal", "Brazo Derecho - Proximal", "Br.Der.P", View::Front, Side::Right, BodyPartCategory::Arms),
    part("arm_right_distal", "Brazo Derecho - Distal", "Br.Der.D", View::Front, Side::Right, BodyPartCategory::Arms),
    part("forearm_left_anterolateral", "Antebrazo Izquierdo - Anterolateral", "An.Izq.AL", View::Front, Side::Left, BodyPartCategory::Forearms),
    part("forearm_left_posterolateral", "Antebrazo Izquierdo - Posterolateral", "An.Izq.PL", View::Back, Side::Left, BodyPartCategory::Forearms),
    part("forearm_right_anterolateral", "Antebrazo Derecho - Anterolateral", "An.Der.AL", View::Front, Side::Right, BodyPartCategory::Forearms),
    part("forearm_right_posterolateral", "Antebrazo Derecho - Posterolateral", "An.Der.PL", View::Back, Side::Right, BodyPartCategory::Forearms),
    part("hand_left_palma", "Mano Izquierda - Palma", "Ma.Izq.Pl", View::Front, Side::Left, BodyPartCategory::Hands),
    part("hand_left_dorso", "Mano Izquierda - Dorso", "Ma.Izq.D", View::Front, Side::Left, BodyPartCategory::Hands),
    part("hand_right_palma", "Mano Derecha - Palma", "Ma.Der.Pl", View::Front, Side::Right, BodyPartCategory::Hands),
    part("hand_right_dorso", "Mano Derecha - Dorso", "Ma.Der.D", View::Front, Side::Right, BodyPartCategory::Hands),
    part("dorsal_left_superior", "Dorsales Izquierdo - Superior", "Do.Izq.S", View::Back, Side::Left, BodyPartCategory::Back),
    part("dorsal_left_inferior", "Dorsales Izquierdo - Inferior", "Do.Izq.I", View::Back, Side::Left, BodyPartCategory::Back),
    part("dorsal_right_superior", "Dorsales Derecho - Superior", "Do.Der.S", View::Back, Side::Right, BodyPartCategory::Back),
    part("dorsal_right_inferior", "Dorsales Derecho - Inferior", "Do.Der.I", View::Back, Side::Right, BodyPartCategory::Back),
    part("lumbar_left_superior", "Lumbares Izquierdo - Superior", "Lu.Izq.S", View::Back, Side::Left, BodyPartCategory::LowerBack),
    part("lumbar_left_inferior", "Lumbares Izquierdo - Inferior", "Lu.Izq.I", View::Back, Side::Left, BodyPartCategory::LowerBack),
    part("lumbar_right_superior", "Lumbares Derecho - Superior", "Lu.Der.S", View::Back, Side::Right, BodyPartCategory::LowerBack),
    part("lumbar_right_inferior", "Lumbares Derecho - Inferior", "Lu.Der.I", View::Back, Side::Right, BodyPartCategory::LowerBack),
    part("sacroiliac_left_superior", "Zona Sacroilíaca Izquierda - Superior", "ZS.Izq.S", View::Back, Side::Left, BodyPartCategory::Pelvis),
    part("sacroiliac_left_inferior", "Zona Sacroilíaca Izquierda - Inferior", "ZS.Izq.I", View::Back, Side::Left, BodyPartCategory::Pelvis),
    part("sacroiliac_right_superior", "Zona Sacroilíaca Derecha - Superior", "ZS.Der.S", View::Back, Side::Right, BodyPartCategory::Pelvis),
    part("sacroiliac_right_inferior", "Zona Sacroilíaca Derecha - Inferior", "ZS.Der.I", View::Back, Side::Right, BodyPartCategory::Pelvis),
    part("gluteal_left_superior", "Glúteo Izquierdo - Superior", "Gl.Izq.S", View::Back, Side::Left, BodyPartCategory::Pelvis),
    part("gluteal_left_inferior", "Glúteo Izquierdo - Inferior", "Gl.Izq.I", View::Back, Side::Left, BodyPartCategory::Pelvis),
    part("gluteal_right_superior", "Glúteo Derecho - Superior", "Gl.Der.S", View::Back, Side::Right, BodyPartCategory::Pelvis),
    part("gluteal_right_inferior", "Glúteo Derecho - Inferior", "Gl.Der.I", View::Back, Side::Right, BodyPartCategory::Pelvis),
    part("groin_left_medial", "Ingle Izquierda - Medial", "In.Izq.M", View::Front, Side::Left, BodyPartCategory::Pelvis),
    part("groin_left_lateral", "Ingle Izquierda - Lateral", "In.Izq.L", View::Front, Side::Left, BodyPartCategory::Pelvis),
    part("groin_right_medial", "Ingle Derecha - Medial", "In.Der.M", View::Front, Side::Right, BodyPartCategory::Pelvis),
    part("groin_right_lateral", "Ingle Derecha - Lateral", "In.Der.L", View::Front, Side::Right, BodyPartCategory::Pelvis),
    part("thigh_left_anterior", "Muslo Izquierdo - Anterior", "Mu.Izq.A", View::Front, Side::Left, BodyPartCategory::Thighs),
    part("thigh_left_posterior", "Muslo Izquierdo - Posterior", "Mu.Izq.P", View::Back, Side::Left, BodyPartCategory::Thighs),
    part("thigh_right_anterior", "Muslo Derecho - Anterior", "Mu.Der.A", View::Front, Side::Right, BodyPartCategory::Thighs),
    part("thigh_right_posterior", "Muslo Derecho - Posterior", "Mu.Der.P", View::Back, Side::Right, BodyPartCategory::Thighs),
    part("knee_left_lateral", "Rodilla Izquierda - Lateral", "Ro.Izq.L", View::Front, Side::Left, BodyPartCategory::Knees),
    part("knee_left_medial", "Rodilla Izquierda - Medial", "Ro.Izq.M", View::Front, Side::Left, BodyPartCategory::Knees),
    part("knee_right_lateral", "Rodilla Derecha - Lateral", "Ro.Der.L", View::Front, Side::Right, BodyPartCategory::Knees),
    part("knee_right_medial", "Rodilla Derecha - Medial", "Ro.Der.M", View::Front, Side::Right, BodyPartCategory::Knees),
    part("shin_left_anterior", "Canilla Izquierda - Anterior", "Ca.Izq.A", View::Front, Side::Left, BodyPartCategory::Shins),
    part("shin_left_posterior", "Pantorrilla Izquierda - Posterior", "Pa.Izq.P", View::Back, Side::Left, BodyPartCategory::Shins),
    part("shin_right_anterior", "Canilla Derecha - Anterior", "Ca.Der.A", View::Front, Side::Right, BodyPartCategory::Shins),
    part("shin_right_posterior", "Pantorrilla Derecha - Posterior", "Pa.Der.P", View::Back, Side::Right, BodyPartCategory::Shins),
    part("ankle_left_anterolateral", "Tobillo Izquierdo - Anterolateral", "To.Izq.AL", View::Front, Side::Left, BodyPartCategory::Feet),
    part("ankle_left_posterolateral", "Tobillo Izquierdo - Posterolateral", "To.Izq.PL", View::Back, Side::Left, BodyPartCategory::Feet),
    part("ankle_right_anterolateral", "Tobillo Derecho - Anterolateral", "To.Der.AL", View::Front, Side::Right, BodyPartCategory::Feet),
    part("ankle_right_posterolateral", "Tobillo Derecho - Posterolateral", "To.Der.PL", View::Back, Side::Right, BodyPartCategory::Feet),
    part("foot_left_dorso", "Pie Izquierdo - Dorso", "Pi.Izq.D", View::Front, Side::Left, BodyPartCategory::Feet),
    part("foot_left_planta", "Pie Izquierdo - Planta", "Pi.Izq.Pl", View::Front, Side::Left, BodyPartCategory::Feet),
    part("foot_right_dorso", "Pie Derecho - Dorso", "Pi.Der.D", View::Front, Side::Right, BodyPartCategory::Feet),
    part("foot_right_planta", "Pie Derecho - Planta", "Pi.Der.Pl", View::Front, Side::Right, BodyPartCategory::Feet),
];

static LEGACY_CATALOG: LazyLock<RegionCatalog> =
    LazyLock::new(|| RegionCatalog::build("1.0", &LEGACY_PARTS));

static REFINED_CATALOG: LazyLock<RegionCatalog> =
    LazyLock::new(|| RegionCatalog::build("2.0", &REFINED_PARTS));

/// The 30-region catalog persisted data was originally recorded against.
pub fn legacy_catalog() -> &'static RegionCatalog {
    &LEGACY_CATALOG
}

/// The 60-region catalog new data is recorded against.
pub fn refined_catalog() -> &'static RegionCatalog {
    &REFINED_CATALOG
}

/// Resolves an identifier against the refined catalog first, then the legacy one.
pub fn resolve_region(region_id: &str) -> Option<(RegionSystem, &'static RegionDefinition)> {
    refined_catalog()
        .get(region_id)
        .map(|part| (RegionSystem::Refined, part))
        .or_else(|| legacy_catalog().get(region_id).map(|part| (RegionSystem::Legacy, part)))
}
