//! Application-facing tracker: owns the in-memory record set, the migration
//! status shown to the user, and every path that mutates persisted data.
//!
//! Migration status moves through:
//!
//! ```text
//! pending ──load──► needs-migration ──perform_migration──► migrated
//!            │                        └──────────────────► no-migration
//!            │                        └──(any failure)───► error
//!            └────► no-migration
//! ```
//!
//! Loading only detects. Nothing is converted until the host calls
//! [`PainTracker::perform_migration`] on the user's behalf.

use chrono::{Local, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::migration::{
    create_migration_backup, detect_system_version, get_migration_summary, is_migration_needed,
    migrate_all_legacy_entries, restore_migration_backup, MigrationStats, MigrationSummary,
    MigrationType,
};
use crate::pain_model::{iso_timestamp, BodyPartEntry, PainEntry, PainType, RecordSet, SystemVersion};
use crate::region_catalog::{resolve_region, RegionSystem};
use crate::tracker_store::{PersistenceAdapter, RecordStorage, SaveOutcome};
use crate::validation::{is_valid_body_part_id, is_valid_intensity_level, is_valid_iso_date, validate_pain_entry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationStatus {
    Pending,
    NeedsMigration,
    NoMigration,
    Migrated,
    Error,
}

/// Snapshot of everything the migration notice needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStatus {
    pub migration_status: MigrationStatus,
    pub notice_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_summary: Option<MigrationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_migration: Option<MigrationStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub entry_count: usize,
    /// Dates of stored days that could not be read; they are kept as stored.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unreadable_entries: Vec<String>,
}

pub struct PainTracker<S: RecordStorage> {
    store: PersistenceAdapter<S>,
    entries: RecordSet,
    migration_status: MigrationStatus,
    migration_summary: Option<MigrationSummary>,
    last_migration: Option<MigrationStats>,
    error: Option<String>,
    notice_visible: bool,
}

impl<S: RecordStorage> PainTracker<S> {
    /// A tracker that has not loaded yet; status is `pending`.
    pub fn new(storage: S) -> Self {
        Self {
            store: PersistenceAdapter::new(storage),
            entries: RecordSet::new(),
            migration_status: MigrationStatus::Pending,
            migration_summary: None,
            last_migration: None,
            error: None,
            notice_visible: false,
        }
    }

    /// Creates a tracker and runs [`load`](Self::load).
    pub fn open(storage: S) -> Self {
        let mut tracker = Self::new(storage);
        tracker.load();
        tracker
    }

    /// Reads the stored records and decides whether migration is on offer.
    pub fn load(&mut self) {
        let data = self.store.load();
        self.detect(&data);
        self.entries = data;
    }

    fn detect(&mut self, data: &RecordSet) {
        let unreadable = self.store.unreadable().len();
        if let Some(reason) = self.store.locked_reason() {
            self.error = Some(format!("Stored data is unreadable and will not be overwritten: {reason}"));
        } else if unreadable > 0 {
            self.error = Some(format!(
                "{unreadable} stored entries could not be read and were left unchanged"
            ));
        }

        if is_migration_needed(data) {
            let mut summary = get_migration_summary(data);
            summary.unreadable_entry_count = unreadable;
            info!(
                "Legacy entries detected: {} of {} need migration",
                summary.legacy_entry_count,
                data.len()
            );
            self.migration_summary = Some(summary);
            self.migration_status = MigrationStatus::NeedsMigration;
        } else {
            self.migration_summary = None;
            self.migration_status = MigrationStatus::NoMigration;
        }
        self.notice_visible = true;
    }

    /// Backs up, migrates and persists the stored records.
    ///
    /// Never returns an error: failures land in the `error` status with a
    /// readable message and leave the stored records as they were.
    pub fn perform_migration(&mut self) -> MigrationStatus {
        match self.migrate_and_persist() {
            Ok((records, migration_type, stats)) => {
                info!("Migration complete: {migration_type:?} {stats:?}");
                self.entries = records;
                self.error = None;
                self.last_migration = Some(stats);
                self.migration_status = if migration_type == MigrationType::NoMigration {
                    MigrationStatus::NoMigration
                } else {
                    MigrationStatus::Migrated
                };
            }
            Err(e) => {
                error!("Migration error: {e}");
                self.migration_status = MigrationStatus::Error;
                self.error = Some(format!("Migration failed: {e}"));
            }
        }

        self.notice_visible = true;
        self.migration_status
    }

    fn migrate_and_persist(&mut self) -> Result<(RecordSet, MigrationType, MigrationStats), TrackerError> {
        let current = self.store.load();

        let snapshot = create_migration_backup(&current)?;
        self.store.backup(&snapshot)?;

        let mut outcome = migrate_all_legacy_entries(&current);
        let unreadable = self.store.unreadable();
        outcome.record_unreadable(unreadable.iter().map(|(date, entry)| (date.as_str(), entry.reason.as_str())));
        for message in &outcome.stats.errors {
            warn!("{message}");
        }

        let records = self.persist(outcome.migrated_entries)?;
        Ok((records, outcome.migration_type, outcome.stats))
    }

    /// Hides the migration notice. Data and status are untouched.
    pub fn dismiss_notification(&mut self) {
        self.notice_visible = false;
    }

    /// Accepts the current state as final: status becomes `no-migration`.
    pub fn acknowledge_migration(&mut self) {
        self.migration_status = MigrationStatus::NoMigration;
        self.notice_visible = false;
    }

    /// Reinstates the snapshot taken before the last migration of this
    /// session and re-runs detection on it.
    pub fn restore_backup(&mut self) -> Result<MigrationStatus, TrackerError> {
        let snapshot = self.store.last_backup()?.ok_or(TrackerError::NoBackup)?;
        let restored = restore_migration_backup(&snapshot)?;

        let restored = self.persist(restored)?;
        info!("Restored {} entries from migration backup", restored.len());
        self.detect(&restored);
        self.entries = restored;
        self.last_migration = None;
        Ok(self.migration_status)
    }

    /// Records a rating for today.
    pub fn record_pain(
        &mut self,
        region_id: &str,
        intensity_level: u8,
        pain_type: Option<PainType>,
    ) -> Result<PainEntry, TrackerError> {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        self.record_pain_on(&today, region_id, intensity_level, pain_type)
    }

    /// Adds or replaces the rating of `region_id` on `date`, creating the day
    /// if needed.
    pub fn record_pain_on(
        &mut self,
        date: &str,
        region_id: &str,
        intensity_level: u8,
        pain_type: Option<PainType>,
    ) -> Result<PainEntry, TrackerError> {
        check_rating(date, region_id, intensity_level)?;
        self.ensure_readable(date)?;

        let now = Utc::now();
        let entry = self
            .entries
            .get(date)
            .cloned()
            .unwrap_or_else(|| PainEntry::empty(date, now));

        self.write_rating(entry, region_id, intensity_level, pain_type)
    }

    /// Replaces a rating on an existing day.
    pub fn update_pain(
        &mut self,
        date: &str,
        region_id: &str,
        intensity_level: u8,
        pain_type: Option<PainType>,
    ) -> Result<PainEntry, TrackerError> {
        check_rating(date, region_id, intensity_level)?;
        self.ensure_readable(date)?;

        let entry = self
            .entries
            .get(date)
            .cloned()
            .ok_or_else(|| TrackerError::EntryNotFound(date.to_string()))?;

        self.write_rating(entry, region_id, intensity_level, pain_type)
    }

    fn write_rating(
        &mut self,
        mut entry: PainEntry,
        region_id: &str,
        intensity_level: u8,
        pain_type: Option<PainType>,
    ) -> Result<PainEntry, TrackerError> {
        let is_legacy_region = matches!(resolve_region(region_id), Some((RegionSystem::Legacy, _)));
        if is_legacy_region && entry.system_version() == SystemVersion::Refined60 {
            return Err(TrackerError::LegacyRegionInRefinedEntry {
                region_id: region_id.to_string(),
                date: entry.date.clone(),
            });
        }

        let stamp = iso_timestamp(Utc::now());
        let rating = BodyPartEntry {
            recorded_at: Some(stamp.clone()),
            pain_type,
            ..BodyPartEntry::new(region_id, intensity_level)
        };

        entry.body_part_entries.insert(region_id.to_string(), rating);
        entry.updated_at = stamp;
        if entry.system_version() != SystemVersion::Refined60 {
            let version = detect_system_version(&entry);
            entry.set_system_version(version);
        }
        if !validate_pain_entry(&entry) {
            return Err(TrackerError::InvalidEntry(entry.date));
        }

        let mut next = self.entries.clone();
        next.insert(entry.date.clone(), entry.clone());
        self.entries = self.persist(next)?;
        Ok(entry)
    }

    /// Removes one rating. The day itself is deleted when its last rating
    /// goes; `Ok(None)` reports that case.
    pub fn remove_pain(&mut self, date: &str, region_id: &str) -> Result<Option<PainEntry>, TrackerError> {
        self.ensure_readable(date)?;
        let mut entry = self
            .entries
            .get(date)
            .cloned()
            .ok_or_else(|| TrackerError::EntryNotFound(date.to_string()))?;

        entry.body_part_entries.shift_remove(region_id);

        let mut next = self.entries.clone();
        let remaining = if entry.body_part_entries.is_empty() {
            next.remove(date);
            None
        } else {
            entry.updated_at = iso_timestamp(Utc::now());
            next.insert(date.to_string(), entry.clone());
            Some(entry)
        };

        self.entries = self.persist(next)?;
        Ok(remaining)
    }

    /// Deletes a whole day. Returns whether it existed.
    pub fn delete_day(&mut self, date: &str) -> Result<bool, TrackerError> {
        if !self.entries.contains_key(date) {
            return Ok(false);
        }

        let mut next = self.entries.clone();
        next.remove(date);
        self.entries = self.persist(next)?;
        Ok(true)
    }

    fn ensure_readable(&self, date: &str) -> Result<(), TrackerError> {
        if self.store.unreadable().contains_key(date) {
            return Err(TrackerError::UnreadableEntry(date.to_string()));
        }
        Ok(())
    }

    /// Saves `records`; on success returns what is now stored.
    fn persist(&mut self, mut records: RecordSet) -> Result<RecordSet, TrackerError> {
        match self.store.save(&records) {
            SaveOutcome::Saved => Ok(records),
            SaveOutcome::SavedAfterEviction { evicted } => {
                for date in &evicted {
                    records.remove(date);
                }
                Ok(records)
            }
            SaveOutcome::Failed(reason) => Err(TrackerError::Storage(reason)),
        }
    }

    pub fn entries(&self) -> &RecordSet {
        &self.entries
    }

    pub fn entry_by_date(&self, date: &str) -> Option<&PainEntry> {
        self.entries.get(date)
    }

    pub fn today_entry(&self) -> Option<&PainEntry> {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        self.entries.get(&today)
    }

    /// Every day, newest first.
    pub fn all_entries(&self) -> Vec<&PainEntry> {
        self.entries.values().rev().collect()
    }

    pub fn migration_status(&self) -> MigrationStatus {
        self.migration_status
    }

    pub fn migration_summary(&self) -> Option<&MigrationSummary> {
        self.migration_summary.as_ref()
    }

    pub fn last_migration(&self) -> Option<&MigrationStats> {
        self.last_migration.as_ref()
    }

    pub fn is_notice_visible(&self) -> bool {
        self.notice_visible
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn status(&self) -> TrackerStatus {
        TrackerStatus {
            migration_status: self.migration_status,
            notice_visible: self.notice_visible,
            migration_summary: self.migration_summary,
            last_migration: self.last_migration.clone(),
            error: self.error.clone(),
            entry_count: self.entries.len(),
            unreadable_entries: self.store.unreadable().keys().cloned().collect(),
        }
    }

    pub fn storage(&self) -> &S {
        self.store.storage()
    }

    pub fn storage_mut(&mut self) -> &mut S {
        self.store.storage_mut()
    }
}

fn check_rating(date: &str, region_id: &str, intensity_level: u8) -> Result<(), TrackerError> {
    if !is_valid_iso_date(date) {
        return Err(TrackerError::InvalidDate(date.to_string()));
    }
    if !is_valid_body_part_id(region_id) {
        return Err(TrackerError::UnknownBodyPart(region_id.to_string()));
    }
    if !is_valid_intensity_level(f64::from(intensity_level)) {
        return Err(TrackerError::InvalidIntensity(f64::from(intensity_level)));
    }
    Ok(())
}
