//! Legacy 30-region → refined 60-region migration.
//!
//! Every function here is pure: it borrows a [`RecordSet`] or [`PainEntry`]
//! and returns new values plus diagnostics. Persisting the result (and the
//! backup taken before it) is the caller's job, see
//! [`crate::pain_tracker::PainTracker::perform_migration`].
//!
//! Conversion rules:
//!
//! - a mapped legacy region fans out to each of its refined targets, every
//!   copy carrying the source's intensity, timestamp, notes and pain type;
//! - a region with no mapping is kept under its original key;
//! - when two sources land on the same refined region, the source written
//!   last wins and the region keeps the position where it first appeared;
//! - the converted entry is stamped `refined-60`, which makes a second pass a
//!   no-op.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, TrackerError};
use crate::legacy_mapping::{is_mapped_legacy_id, refined_targets};
use crate::pain_model::{iso_timestamp, BodyPartEntries, PainEntry, RecordSet, SystemVersion};
use crate::region_catalog::refined_catalog;
use crate::validation::is_valid_intensity_level;

/// How much of a record set a migration pass converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationType {
    NoMigration,
    Partial,
    Complete,
}

impl MigrationType {
    fn classify(converted: usize, total: usize) -> Self {
        if converted == 0 {
            MigrationType::NoMigration
        } else if converted == total {
            MigrationType::Complete
        } else {
            MigrationType::Partial
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStats {
    pub total_entries: usize,
    pub migrated_count: usize,
    pub skipped_count: usize,
    /// One message per entry that could not be converted.
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationOutcome {
    pub migrated_entries: RecordSet,
    pub migration_type: MigrationType,
    pub stats: MigrationStats,
}

impl MigrationOutcome {
    /// Reports stored entries that never parsed as skipped failures, one
    /// error each, and reclassifies the pass over the enlarged total.
    pub fn record_unreadable<'a>(&mut self, unreadable: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (date_key, reason) in unreadable {
            self.stats.total_entries += 1;
            self.stats.skipped_count += 1;
            self.stats.errors.push(format!("Error migrating entry for {date_key}: {reason}"));
        }
        self.migration_type = MigrationType::classify(self.stats.migrated_count, self.stats.total_entries);
    }
}

/// Read-only projection of what a migration would do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    pub needs_migration: bool,
    pub legacy_entry_count: usize,
    pub modern_entry_count: usize,
    /// Region ratings across all entries before migration.
    pub total_regions: usize,
    /// Region ratings across all entries after migration.
    pub estimated_new_regions: usize,
    /// Stored entries that could not be read; migration leaves them as stored.
    pub unreadable_entry_count: usize,
}

/// An entry needs migration when it is not stamped `refined-60` and at least
/// one of its keys is a mapped legacy id.
///
/// Entries with no recognizable legacy key are left alone.
pub fn is_legacy_entry(entry: &PainEntry) -> bool {
    if entry.system_version() == SystemVersion::Refined60 {
        return false;
    }

    entry.body_part_entries.keys().any(|region_id| is_mapped_legacy_id(region_id))
}

/// Catalog generation implied by an entry's keys, ignoring its metadata.
///
/// Keys unknown to both catalogs do not count either way; an entry with no
/// refined key reads as legacy.
pub fn detect_system_version(entry: &PainEntry) -> SystemVersion {
    let keys = entry.body_part_entries.keys();
    let (legacy, refined) = keys.fold((false, false), |(legacy, refined), region_id| {
        (
            legacy || is_mapped_legacy_id(region_id),
            refined || refined_catalog().contains(region_id),
        )
    });

    match (legacy, refined) {
        (true, true) => SystemVersion::Hybrid,
        (false, true) => SystemVersion::Refined60,
        _ => SystemVersion::Legacy30,
    }
}

pub fn is_migration_needed(records: &RecordSet) -> bool {
    records.values().any(is_legacy_entry)
}

/// Converts one entry, stamping it with the current time.
pub fn migrate_legacy_pain_entry(entry: &PainEntry) -> Result<PainEntry, MigrationError> {
    migrate_legacy_pain_entry_at(entry, Utc::now())
}

/// Converts one entry as of `now`.
///
/// `createdAt` and any existing metadata are kept; `updatedAt`,
/// `systemVersion` and `migratedAt` are set.
pub fn migrate_legacy_pain_entry_at(
    entry: &PainEntry,
    now: DateTime<Utc>,
) -> Result<PainEntry, MigrationError> {
    let mut converted: BodyPartEntries = IndexMap::with_capacity(entry.body_part_entries.len() * 2);

    for (region_id, rating) in &entry.body_part_entries {
        if !is_valid_intensity_level(f64::from(rating.intensity_level)) {
            return Err(MigrationError::InvalidIntensity {
                region_id: region_id.clone(),
                level: rating.intensity_level,
            });
        }

        match refined_targets(region_id) {
            Some(targets) => {
                for target in targets {
                    converted.insert(target.to_string(), rating.reassigned_to(target));
                }
            }
            None if refined_catalog().contains(region_id) => {
                debug!("Region {region_id} on {} is already refined", entry.date);
                converted.insert(region_id.clone(), rating.clone());
            }
            None => {
                warn!("Unknown legacy region ID during migration: {region_id} (kept as-is)");
                converted.insert(region_id.clone(), rating.clone());
            }
        }
    }

    let stamp = iso_timestamp(now);
    let mut metadata = entry.metadata.clone().unwrap_or_default();
    metadata.system_version = Some(SystemVersion::Refined60);
    metadata.migrated_at = Some(stamp.clone());

    Ok(PainEntry {
        date: entry.date.clone(),
        body_part_entries: converted,
        created_at: entry.created_at.clone(),
        updated_at: stamp,
        metadata: Some(metadata),
    })
}

pub fn migrate_all_legacy_entries(records: &RecordSet) -> MigrationOutcome {
    migrate_all_legacy_entries_at(records, Utc::now())
}

/// Migrates every legacy entry of `records` as of `now`.
///
/// An entry that fails to convert is kept exactly as it was and reported in
/// `stats.errors`; the rest of the batch still runs.
pub fn migrate_all_legacy_entries_at(records: &RecordSet, now: DateTime<Utc>) -> MigrationOutcome {
    let mut migrated_entries = RecordSet::new();
    let mut stats = MigrationStats {
        total_entries: records.len(),
        ..MigrationStats::default()
    };

    for (date_key, entry) in records {
        if !is_legacy_entry(entry) {
            migrated_entries.insert(date_key.clone(), entry.clone());
            stats.skipped_count += 1;
            continue;
        }

        match migrate_keyed_entry(date_key, entry, now) {
            Ok(converted) => {
                migrated_entries.insert(date_key.clone(), converted);
                stats.migrated_count += 1;
            }
            Err(err) => {
                warn!("Keeping original entry for {date_key}: {err}");
                stats.errors.push(format!("Error migrating entry for {date_key}: {err}"));
                migrated_entries.insert(date_key.clone(), entry.clone());
                stats.skipped_count += 1;
            }
        }
    }

    let migration_type = MigrationType::classify(stats.migrated_count, stats.total_entries);
    info!(
        "Migration pass finished: {:?} ({} migrated, {} skipped, {} errors)",
        migration_type,
        stats.migrated_count,
        stats.skipped_count,
        stats.errors.len()
    );

    MigrationOutcome {
        migrated_entries,
        migration_type,
        stats,
    }
}

fn migrate_keyed_entry(
    date_key: &str,
    entry: &PainEntry,
    now: DateTime<Utc>,
) -> Result<PainEntry, MigrationError> {
    // An entry filed under another day's key stays as stored; the stamped
    // refined entry would otherwise disagree with the key it is saved under.
    if entry.date != date_key {
        return Err(MigrationError::DateMismatch {
            key: date_key.to_string(),
            date: entry.date.clone(),
        });
    }

    migrate_legacy_pain_entry_at(entry, now)
}

/// The migration type a pass over `records` would report if no entry failed.
pub fn projected_migration_type(records: &RecordSet) -> MigrationType {
    let legacy = records.values().filter(|entry| is_legacy_entry(entry)).count();
    MigrationType::classify(legacy, records.len())
}

/// Dry run: counts legacy and modern entries and how many region ratings
/// migration would produce. Unmapped regions count once.
pub fn get_migration_summary(records: &RecordSet) -> MigrationSummary {
    let mut summary = MigrationSummary::default();

    for entry in records.values() {
        if is_legacy_entry(entry) {
            summary.legacy_entry_count += 1;
        } else {
            summary.modern_entry_count += 1;
        }

        for region_id in entry.body_part_entries.keys() {
            summary.total_regions += 1;
            summary.estimated_new_regions += refined_targets(region_id).map_or(1, |targets| targets.len());
        }
    }

    summary.needs_migration = summary.legacy_entry_count > 0;
    summary
}

/// Serializes `records` as pretty-printed JSON, the undo point taken before a
/// migration is written.
pub fn create_migration_backup(records: &RecordSet) -> Result<String, TrackerError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parses a snapshot produced by [`create_migration_backup`].
pub fn restore_migration_backup(snapshot: &str) -> Result<RecordSet, TrackerError> {
    serde_json::from_str(snapshot).map_err(|err| {
        error!("Failed to restore backup: {err}");
        TrackerError::InvalidBackup(err.to_string())
    })
}
