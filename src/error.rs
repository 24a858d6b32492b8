//! Error types for the tracker core.
//!
//! [`MigrationError`] describes why a single day's entry could not be
//! converted; the batch migration collects these instead of aborting.
//! [`TrackerError`] covers everything that can fail a whole call: storage,
//! backups, validation and lookups.

use thiserror::Error;

/// Failure to convert one entry to refined regions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    #[error("region '{region_id}' has intensity {level}, expected 1-10")]
    InvalidIntensity { region_id: String, level: u8 },

    #[error("entry is keyed '{key}' but dated '{date}'")]
    DateMismatch { key: String, date: String },
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("database error: {0}")]
    Database(#[source] lmdb::Error),

    #[error("storage is full")]
    StorageFull,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid backup format: {0}")]
    InvalidBackup(String),

    #[error("no backup available")]
    NoBackup,

    #[error("no entry found for date {0}")]
    EntryNotFound(String),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("unknown body part '{0}'")]
    UnknownBodyPart(String),

    #[error("invalid intensity level {0}, expected an integer from 1 to 10")]
    InvalidIntensity(f64),

    #[error("entry for {0} does not pass validation")]
    InvalidEntry(String),

    #[error("stored entry for {0} could not be read and is left unchanged")]
    UnreadableEntry(String),

    #[error("legacy region '{region_id}' cannot be recorded on {date}, which already uses refined regions")]
    LegacyRegionInRefinedEntry { region_id: String, date: String },

    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

impl From<lmdb::Error> for TrackerError {
    fn from(err: lmdb::Error) -> Self {
        match err {
            lmdb::Error::MapFull => TrackerError::StorageFull,
            other => TrackerError::Database(other),
        }
    }
}
