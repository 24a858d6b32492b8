//! Data model for persisted pain records.
//!
//! The persisted state of the application is a [`RecordSet`]: one
//! [`PainEntry`] per calendar day, each holding a [`BodyPartEntry`] per
//! region the user rated that day.
//!
//! Field names serialize in camelCase so the stored JSON matches documents
//! exported by the browser application:
//!
//! ```json
//! {
//!   "2024-01-15": {
//!     "date": "2024-01-15",
//!     "bodyPartEntries": {
//!       "left_shoulder": { "bodyPartId": "left_shoulder", "intensityLevel": 7 }
//!     },
//!     "createdAt": "2024-01-15T08:00:00.000Z",
//!     "updatedAt": "2024-01-15T08:00:00.000Z"
//!   }
//! }
//! ```
//!
//! Optional fields are omitted when absent rather than written as `null`, so a
//! record set survives a serialize/deserialize cycle unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// All pain entries keyed by `YYYY-MM-DD`. Sorted, so iteration runs oldest first.
pub type RecordSet = BTreeMap<String, PainEntry>;

/// Region id → rating, in the order regions were recorded.
pub type BodyPartEntries = IndexMap<String, BodyPartEntry>;

/// Qualitative classification of a pain rating.
///
/// `Unknown` is an explicit answer ("I can't tell"), distinct from a rating
/// that carries no pain type at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PainType {
    Pulsatile,
    Burning,
    Electric,
    Sharp,
    Deep,
    Stiffness,
    Tenderness,
    Unknown,
}

impl PainType {
    pub const ALL: [PainType; 8] = [
        PainType::Pulsatile,
        PainType::Burning,
        PainType::Electric,
        PainType::Sharp,
        PainType::Deep,
        PainType::Stiffness,
        PainType::Tenderness,
        PainType::Unknown,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PainType::Pulsatile => "pulsatile",
            PainType::Burning => "burning",
            PainType::Electric => "electric",
            PainType::Sharp => "sharp",
            PainType::Deep => "deep",
            PainType::Stiffness => "stiffness",
            PainType::Tenderness => "tenderness",
            PainType::Unknown => "unknown",
        }
    }

    pub fn from_code(code: &str) -> Option<PainType> {
        PainType::ALL.into_iter().find(|pain_type| pain_type.code() == code)
    }
}

/// Region catalog generation an entry was recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SystemVersion {
    #[default]
    #[serde(rename = "legacy-30")]
    Legacy30,
    #[serde(rename = "refined-60")]
    Refined60,
    #[serde(rename = "hybrid")]
    Hybrid,
}

/// Optional bookkeeping attached to a day's entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Unset means the entry predates versioning and is treated as legacy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_version: Option<SystemVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_at: Option<String>,
}

/// One intensity rating for one region on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPartEntry {
    pub body_part_id: String,
    /// Integer 1–10.
    pub intensity_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_type: Option<PainType>,
}

impl BodyPartEntry {
    pub fn new(body_part_id: impl Into<String>, intensity_level: u8) -> Self {
        Self {
            body_part_id: body_part_id.into(),
            intensity_level,
            recorded_at: None,
            notes: None,
            pain_type: None,
        }
    }

    /// Copy of this rating filed under another region.
    pub fn reassigned_to(&self, body_part_id: &str) -> Self {
        Self {
            body_part_id: body_part_id.to_string(),
            ..self.clone()
        }
    }
}

/// Everything recorded for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainEntry {
    /// `YYYY-MM-DD`; equal to the entry's key in the [`RecordSet`].
    pub date: String,
    #[serde(default)]
    pub body_part_entries: BodyPartEntries,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EntryMetadata>,
}

impl PainEntry {
    /// Empty entry for `date`, stamped at `now`.
    pub fn empty(date: impl Into<String>, now: DateTime<Utc>) -> Self {
        let stamp = iso_timestamp(now);
        Self {
            date: date.into(),
            body_part_entries: IndexMap::new(),
            created_at: stamp.clone(),
            updated_at: stamp,
            metadata: None,
        }
    }

    /// Declared catalog version; entries without metadata count as legacy.
    pub fn system_version(&self) -> SystemVersion {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.system_version)
            .unwrap_or_default()
    }

    pub fn set_system_version(&mut self, version: SystemVersion) {
        self.metadata.get_or_insert_with(EntryMetadata::default).system_version = Some(version);
    }
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2024-01-15T08:00:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
