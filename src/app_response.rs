use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::error::TrackerError;

/// Envelope returned, serialized as JSON, by every C ABI function.
#[derive(Debug, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl From<TrackerError> for AppResponse {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::EntryNotFound(_) | TrackerError::NoBackup => {
                AppResponse::NotFound(err.to_string())
            }
            TrackerError::InvalidDate(_)
            | TrackerError::UnknownBodyPart(_)
            | TrackerError::InvalidIntensity(_)
            | TrackerError::InvalidEntry(_)
            | TrackerError::LegacyRegionInRefinedEntry { .. }
            | TrackerError::Migration(_) => AppResponse::ValidationError(err.to_string()),
            TrackerError::Serialization(_)
            | TrackerError::InvalidBackup(_)
            | TrackerError::UnreadableEntry(_) => AppResponse::SerializationError(err.to_string()),
            TrackerError::Database(_) | TrackerError::StorageFull | TrackerError::Storage(_) => {
                AppResponse::DatabaseError(err.to_string())
            }
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    /// `Ok` carrying `value` as JSON, or a `SerializationError` if it cannot be encoded.
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => AppResponse::Ok(json),
            Err(e) => AppResponse::from(e),
        }
    }
}
