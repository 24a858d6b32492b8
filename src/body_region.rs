//! Body-region vocabulary shared by both catalogs.
//!
//! Region identifiers stay plain strings on disk (the persisted JSON is keyed
//! by them), but in memory a refined identifier is handled as a
//! [`RegionHierarchy`]: a primary region, a side and a subdivision. Conversion
//! between the two happens through [`RegionHierarchy::parse`] and
//! [`RegionHierarchy::to_region_id`].

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Laterality of a refined region. Refined identifiers always carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The token used inside region identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Parses an identifier token. Only the exact lowercase words are accepted.
    pub fn from_token(token: &str) -> Option<Side> {
        match token {
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Laterality as stored on a [`RegionDefinition`]; legacy midline regions use `Center`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Laterality {
    Left,
    Right,
    Center,
}

impl From<Side> for Laterality {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => Laterality::Left,
            Side::Right => Laterality::Right,
        }
    }
}

/// Diagram view a region is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Front,
    Back,
}

/// Closed set of anatomical categories used to group regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPartCategory {
    Head,
    Neck,
    Shoulders,
    Arms,
    Forearms,
    Hands,
    Chest,
    Abdomen,
    Back,
    LowerBack,
    Pelvis,
    Thighs,
    Knees,
    Shins,
    Feet,
}

impl BodyPartCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPartCategory::Head => "head",
            BodyPartCategory::Neck => "neck",
            BodyPartCategory::Shoulders => "shoulders",
            BodyPartCategory::Arms => "arms",
            BodyPartCategory::Forearms => "forearms",
            BodyPartCategory::Hands => "hands",
            BodyPartCategory::Chest => "chest",
            BodyPartCategory::Abdomen => "abdomen",
            BodyPartCategory::Back => "back",
            BodyPartCategory::LowerBack => "lower_back",
            BodyPartCategory::Pelvis => "pelvis",
            BodyPartCategory::Thighs => "thighs",
            BodyPartCategory::Knees => "knees",
            BodyPartCategory::Shins => "shins",
            BodyPartCategory::Feet => "feet",
        }
    }
}

impl Display for BodyPartCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one selectable region in a catalog.
///
/// Definitions live in `'static` tables (see [`crate::region_catalog`]), so
/// every text field borrows from the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDefinition {
    pub id: &'static str,
    pub anatomical_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<&'static str>,
    #[serde(rename = "location")]
    pub view: View,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Laterality>,
    pub category: BodyPartCategory,
}

/// Structured form of a refined region identifier.
///
/// `shoulder_left_superior` is `{ primary_region: "shoulder", side: Left,
/// subdivision: "superior" }`. The primary region may itself contain
/// underscores; the side is always the second-to-last token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionHierarchy {
    pub primary_region: String,
    pub side: Side,
    pub subdivision: String,
}

impl RegionHierarchy {
    pub fn new(primary_region: impl Into<String>, side: Side, subdivision: impl Into<String>) -> Self {
        Self {
            primary_region: primary_region.into(),
            side,
            subdivision: subdivision.into(),
        }
    }

    /// Splits a refined identifier into its components.
    ///
    /// Returns `None` for fewer than three `_`-separated tokens or when the
    /// second-to-last token is not exactly `left` or `right`. Legacy ids such as
    /// `left_shoulder` therefore never parse.
    pub fn parse(region_id: &str) -> Option<RegionHierarchy> {
        let tokens: Vec<&str> = region_id.split('_').collect();
        if tokens.len() < 3 {
            return None;
        }

        let side = Side::from_token(tokens[tokens.len() - 2])?;
        let subdivision = tokens[tokens.len() - 1];
        let primary_region = tokens[..tokens.len() - 2].join("_");

        Some(RegionHierarchy {
            primary_region,
            side,
            subdivision: subdivision.to_string(),
        })
    }

    /// Joins the components back into the persisted identifier format.
    pub fn to_region_id(&self) -> String {
        self.to_string()
    }
}

impl Display for RegionHierarchy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.primary_region, self.side, self.subdivision)
    }
}
