//! Persistence for the record set.
//!
//! Two layers:
//!
//! - [`RecordStorage`]: raw, fallible slots for the serialized record set and
//!   the session backup. [`LmdbStorage`] is the on-device implementation,
//!   [`MemoryStorage`] the in-memory one used by tests and embedders without a
//!   filesystem.
//! - [`PersistenceAdapter`]: the policy the rest of the crate relies on.
//!   Loading never fails: days that do not parse are set aside and written
//!   back untouched, and an unreadable document loads as an empty set that is
//!   never written over. Saving never raises: on a full store it evicts
//!   entries older than one month and retries once, then gives up with a
//!   logged [`SaveOutcome::Failed`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{Local, Months, NaiveDate};
use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TrackerError;
use crate::pain_model::{PainEntry, RecordSet};

/// Key holding the serialized record set.
pub const RECORDS_KEY: &str = "painTracker";
/// Key holding the pre-migration snapshot.
pub const BACKUP_KEY: &str = "painDataBackup";

const RECORDS_DB: &str = "records";
const SESSION_DB: &str = "session";

/// Raw storage slots. Implementations only move strings around; parsing and
/// recovery policy live in [`PersistenceAdapter`].
pub trait RecordStorage {
    /// The serialized record set, or `None` if nothing was ever saved.
    fn read_records(&self) -> Result<Option<String>, TrackerError>;

    /// Replaces the serialized record set. Returns
    /// [`TrackerError::StorageFull`] when the store is out of space.
    fn write_records(&mut self, json: &str) -> Result<(), TrackerError>;

    fn read_backup(&self) -> Result<Option<String>, TrackerError>;

    /// Stores a snapshot in the session slot, replacing any previous one.
    fn write_backup(&mut self, snapshot: &str) -> Result<(), TrackerError>;
}

/// Settings for [`LmdbStorage`].
///
/// Deserializes from JSON with every field optional:
///
/// ```json
/// { "path": "/data/user/0/app/pain", "mapSize": 10485760, "maxDbs": 4 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Base path; the environment lives in `{path}.lmdb`.
    pub path: String,
    /// Upper bound of the memory map in bytes. Writes beyond it fail as full.
    pub map_size: usize,
    pub max_dbs: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "pain_tracker".to_string(),
            map_size: 10 * 1024 * 1024,
            max_dbs: 4,
        }
    }
}

impl StoreConfig {
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn environment_dir(&self) -> PathBuf {
        PathBuf::from(format!("{}.lmdb", self.path))
    }
}

/// LMDB-backed storage.
///
/// The record set is one JSON document under [`RECORDS_KEY`] in the
/// `records` database. The `session` database holds the backup and is
/// emptied every time the environment is opened, so a backup lives exactly as
/// long as the session that took it.
pub struct LmdbStorage {
    env: Environment,
    records: Database,
    session: Database,
    dir: PathBuf,
}

impl LmdbStorage {
    pub fn open(config: &StoreConfig) -> Result<Self, TrackerError> {
        let dir = config.environment_dir();
        info!("Opening tracker store at: {}", dir.display());

        std::fs::create_dir_all(&dir).map_err(|e| {
            TrackerError::Storage(format!("cannot create {}: {e}", dir.display()))
        })?;

        let env = Environment::new()
            .set_max_dbs(config.max_dbs)
            .set_map_size(config.map_size)
            .open(&dir)?;

        let records = env.create_db(Some(RECORDS_DB), DatabaseFlags::empty())?;
        let session = env.create_db(Some(SESSION_DB), DatabaseFlags::empty())?;

        {
            let mut txn = env.begin_rw_txn()?;
            txn.clear_db(session)?;
            txn.commit()?;
        }

        Ok(Self {
            env,
            records,
            session,
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Forces buffered writes to disk.
    pub fn flush(&self) -> Result<(), TrackerError> {
        self.env.sync(true)?;
        Ok(())
    }

    fn read_value(&self, db: Database, key: &str) -> Result<Option<String>, TrackerError> {
        let txn = self.env.begin_ro_txn()?;
        let value = match txn.get(db, &key) {
            Ok(bytes) => Some(String::from_utf8(bytes.to_vec()).map_err(|e| {
                TrackerError::Storage(format!("value under '{key}' is not UTF-8: {e}"))
            })?),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        txn.abort();
        Ok(value)
    }

    fn write_value(&self, db: Database, key: &str, value: &str) -> Result<(), TrackerError> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        debug!("Wrote {} bytes under '{key}'", value.len());
        Ok(())
    }
}

impl RecordStorage for LmdbStorage {
    fn read_records(&self) -> Result<Option<String>, TrackerError> {
        self.read_value(self.records, RECORDS_KEY)
    }

    fn write_records(&mut self, json: &str) -> Result<(), TrackerError> {
        self.write_value(self.records, RECORDS_KEY, json)
    }

    fn read_backup(&self) -> Result<Option<String>, TrackerError> {
        self.read_value(self.session, BACKUP_KEY)
    }

    fn write_backup(&mut self, snapshot: &str) -> Result<(), TrackerError> {
        self.write_value(self.session, BACKUP_KEY, snapshot)
    }
}

/// In-memory storage with an optional size limit on the record slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Option<String>,
    backup: Option<String>,
    capacity: Option<usize>,
    reject_backups: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that reports [`TrackerError::StorageFull`] for record sets
    /// larger than `bytes` once serialized.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            capacity: Some(bytes),
            ..Self::default()
        }
    }

    /// Storage pre-populated with a serialized record set.
    pub fn with_records(json: impl Into<String>) -> Self {
        Self {
            records: Some(json.into()),
            ..Self::default()
        }
    }

    /// Makes every backup write fail, for exercising error paths.
    pub fn rejecting_backups(mut self) -> Self {
        self.reject_backups = true;
        self
    }

    pub fn set_capacity(&mut self, bytes: Option<usize>) {
        self.capacity = bytes;
    }

    pub fn raw_records(&self) -> Option<&str> {
        self.records.as_deref()
    }

    pub fn raw_backup(&self) -> Option<&str> {
        self.backup.as_deref()
    }
}

impl RecordStorage for MemoryStorage {
    fn read_records(&self) -> Result<Option<String>, TrackerError> {
        Ok(self.records.clone())
    }

    fn write_records(&mut self, json: &str) -> Result<(), TrackerError> {
        if let Some(capacity) = self.capacity {
            if json.len() > capacity {
                return Err(TrackerError::StorageFull);
            }
        }
        self.records = Some(json.to_string());
        Ok(())
    }

    fn read_backup(&self) -> Result<Option<String>, TrackerError> {
        Ok(self.backup.clone())
    }

    fn write_backup(&mut self, snapshot: &str) -> Result<(), TrackerError> {
        if self.reject_backups {
            return Err(TrackerError::Storage("backup slot unavailable".to_string()));
        }
        self.backup = Some(snapshot.to_string());
        Ok(())
    }
}

/// Result of [`PersistenceAdapter::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The store was full; the listed dates were dropped and the rest saved.
    SavedAfterEviction { evicted: Vec<String> },
    /// Nothing was written. The caller's in-memory copy is the only one.
    Failed(String),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        !matches!(self, SaveOutcome::Failed(_))
    }
}

/// A stored day that did not parse as a [`PainEntry`].
///
/// Its JSON is written back verbatim on every save until it is evicted.
#[derive(Debug, Clone, PartialEq)]
pub struct UnreadableEntry {
    pub raw: Value,
    pub reason: String,
}

/// One day in the stored document.
#[derive(Serialize)]
#[serde(untagged)]
enum StoredEntry<'a> {
    Entry(&'a PainEntry),
    Raw(&'a Value),
}

/// Load/save policy over a [`RecordStorage`].
///
/// Entries are parsed one by one. Days that fail to parse are kept aside as
/// [`UnreadableEntry`] values and merged back into every document this adapter
/// writes. If the stored document as a whole cannot be read, the adapter
/// refuses to overwrite it.
pub struct PersistenceAdapter<S: RecordStorage> {
    storage: S,
    unreadable: BTreeMap<String, UnreadableEntry>,
    locked: Option<String>,
}

impl<S: RecordStorage> PersistenceAdapter<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            unreadable: BTreeMap::new(),
            locked: None,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Days from the last load that did not parse, by date.
    pub fn unreadable(&self) -> &BTreeMap<String, UnreadableEntry> {
        &self.unreadable
    }

    /// Why saving is refused, when the last load could not read the stored
    /// document at all.
    pub fn locked_reason(&self) -> Option<&str> {
        self.locked.as_deref()
    }

    /// The readable part of the stored record set; empty when nothing is
    /// stored or the document cannot be read.
    pub fn load(&mut self) -> RecordSet {
        self.unreadable.clear();
        self.locked = None;

        let json = match self.storage.read_records() {
            Ok(Some(json)) => json,
            Ok(None) => return RecordSet::new(),
            Err(e) => {
                error!("Failed to load pain tracker data: {e}");
                self.locked = Some(format!("stored data could not be read: {e}"));
                return RecordSet::new();
            }
        };

        let document: BTreeMap<String, Value> = match serde_json::from_str(&json) {
            Ok(document) => document,
            Err(e) => {
                error!("Failed to parse pain tracker data: {e}");
                self.locked = Some(format!("stored data could not be parsed: {e}"));
                return RecordSet::new();
            }
        };

        let mut records = RecordSet::new();
        for (date, raw) in document {
            match PainEntry::deserialize(&raw) {
                Ok(entry) => {
                    records.insert(date, entry);
                }
                Err(e) => {
                    warn!("Keeping unreadable entry for {date} as stored: {e}");
                    let reason = e.to_string();
                    self.unreadable.insert(date, UnreadableEntry { raw, reason });
                }
            }
        }
        records
    }

    pub fn save(&mut self, records: &RecordSet) -> SaveOutcome {
        self.save_as_of(records, Local::now().date_naive())
    }

    /// [`save`](Self::save) with an explicit "today" for the eviction cutoff.
    pub fn save_as_of(&mut self, records: &RecordSet, today: NaiveDate) -> SaveOutcome {
        if let Some(reason) = &self.locked {
            warn!("Refusing to overwrite stored pain tracker data: {reason}");
            return SaveOutcome::Failed(format!("refusing to overwrite stored data: {reason}"));
        }

        match self.write(records, None) {
            Ok(()) => SaveOutcome::Saved,
            Err(TrackerError::StorageFull) => self.evict_and_retry(records, today),
            Err(e) => {
                error!("Failed to save pain tracker data: {e}");
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    /// Writes `records` plus the unreadable days, skipping unreadable days
    /// dated before `cutoff`.
    fn write(&mut self, records: &RecordSet, cutoff: Option<&str>) -> Result<(), TrackerError> {
        let mut document: BTreeMap<&str, StoredEntry<'_>> = BTreeMap::new();
        for (date, entry) in &self.unreadable {
            if cutoff.is_some_and(|cutoff| date.as_str() < cutoff) {
                continue;
            }
            document.insert(date, StoredEntry::Raw(&entry.raw));
        }
        for (date, entry) in records {
            document.insert(date, StoredEntry::Entry(entry));
        }

        let json = serde_json::to_string(&document)?;
        self.storage.write_records(&json)
    }

    fn evict_and_retry(&mut self, records: &RecordSet, today: NaiveDate) -> SaveOutcome {
        let cutoff = eviction_cutoff(today);
        let evicted: Vec<String> = records
            .keys()
            .chain(self.unreadable.keys())
            .filter(|date| date.as_str() < cutoff.as_str())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if evicted.is_empty() {
            warn!("Storage is full and no entries predate {cutoff}; nothing saved");
            return SaveOutcome::Failed(TrackerError::StorageFull.to_string());
        }

        let kept: RecordSet = records
            .iter()
            .filter(|(date, _)| date.as_str() >= cutoff.as_str())
            .map(|(date, entry)| (date.clone(), entry.clone()))
            .collect();

        match self.write(&kept, Some(&cutoff)) {
            Ok(()) => {
                self.unreadable.retain(|date, _| date.as_str() >= cutoff.as_str());
                info!("Automatically deleted {} old entries to free up storage.", evicted.len());
                SaveOutcome::SavedAfterEviction { evicted }
            }
            Err(e) => {
                error!("Failed to save after cleanup: {e}");
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    pub fn backup(&mut self, snapshot: &str) -> Result<(), TrackerError> {
        self.storage.write_backup(snapshot)?;
        debug!("Stored migration backup ({} bytes)", snapshot.len());
        Ok(())
    }

    pub fn last_backup(&self) -> Result<Option<String>, TrackerError> {
        self.storage.read_backup()
    }
}

/// Dates strictly before this (`YYYY-MM-DD`) are evicted when the store is full.
pub fn eviction_cutoff(today: NaiveDate) -> String {
    today
        .checked_sub_months(Months::new(1))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}
