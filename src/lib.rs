//! # Pain Tracker Core
//!
//! Local storage and data-migration core for a body-diagram pain tracker,
//! built for FFI integration with Flutter and other cross-platform shells.
//!
//! Users rate pain per body region per day. Regions come from two catalog
//! generations: a legacy 30-region catalog (`left_shoulder`) and a refined
//! 60-region catalog (`shoulder_left_superior`). This crate stores the daily
//! records and converts legacy days to refined regions on request, with a
//! backup taken first and without losing any rating.
//!
//! ## Features
//!
//! - **Region catalogs**: both generations, with hierarchy helpers
//!   ([`region_catalog`], [`region_hierarchy`])
//! - **Lossless migration**: legacy ratings fan out to every mapped
//!   subdivision; unknown regions are kept; re-running is a no-op
//!   ([`migration`])
//! - **LMDB persistence**: the record set plus a session-scoped backup slot
//!   ([`tracker_store`])
//! - **Opt-in migration**: loading only detects legacy data; the user
//!   triggers conversion ([`pain_tracker`])
//! - **Safe error handling**: no `unwrap()` calls in production code
//!
//! ## Quick Start
//!
//! ```no_run
//! use pain_tracker_core::{create_tracker, get_migration_status, perform_migration};
//! use std::ffi::CString;
//!
//! let path = CString::new("pain_data").unwrap();
//! let tracker = create_tracker(path.as_ptr());
//!
//! // {"Ok":"{\"migrationStatus\":\"needs-migration\",...}"}
//! let status = get_migration_status(tracker);
//!
//! // After the user accepts the upgrade
//! let result = perform_migration(tracker);
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_tracker`] / [`create_tracker_with_config`] - Open the store and detect legacy data
//! - [`get_migration_status`] - Current migration status, summary and error
//! - [`perform_migration`] - Back up, migrate and persist
//! - [`dismiss_migration_notice`] - Hide the migration notice
//! - [`restore_backup`] - Reinstate the pre-migration snapshot
//! - [`record_pain`] / [`update_pain`] / [`remove_pain`] / [`delete_day`] - Edit ratings
//! - [`get_entry_by_date`] / [`get_all_entries`] - Read ratings
//! - [`close_tracker`] - Flush and release the tracker
//! - [`free_response`] - Release a string returned by any of the above

pub mod body_region;
pub mod error;
pub mod legacy_mapping;
pub mod migration;
pub mod pain_model;
pub mod pain_tracker;
pub mod region_catalog;
pub mod region_hierarchy;
pub mod tracker_store;
pub mod validation;
mod app_response;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::Deserialize;

use crate::app_response::AppResponse;
use crate::pain_model::PainType;
use crate::pain_tracker::PainTracker;
use crate::tracker_store::{LmdbStorage, StoreConfig};
use crate::validation::is_valid_intensity_level;

/// Tracker backed by on-device LMDB storage; the type behind every FFI handle.
pub type LocalTracker = PainTracker<LmdbStorage>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatingRequest {
    /// Defaults to today for `record_pain`; required for `update_pain`.
    date: Option<String>,
    body_part_id: String,
    intensity_level: f64,
    pain_type: Option<PainType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemovalRequest {
    date: String,
    body_part_id: String,
}

/// Opens (or creates) the tracker store at `{path}.lmdb` and loads it.
///
/// Loading detects legacy data but never migrates it; check
/// [`get_migration_status`] afterwards.
///
/// # Returns
///
/// A tracker handle, or a null pointer if the path is invalid or the store
/// cannot be opened. Release it with [`close_tracker`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use pain_tracker_core::create_tracker;
///
/// let path = CString::new("pain_data").unwrap();
/// let tracker = create_tracker(path.as_ptr());
///
/// if !tracker.is_null() {
///     // Store opened
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_tracker(path: *const c_char) -> *mut LocalTracker {
    if path.is_null() {
        warn!("Null path pointer passed to create_tracker");
        return std::ptr::null_mut();
    }

    let path_str = match unsafe { CStr::from_ptr(path).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in path parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    open_tracker(StoreConfig::for_path(path_str))
}

/// Opens the tracker with a JSON [`StoreConfig`], e.g.
/// `{"path":"pain_data","mapSize":10485760}`. Missing fields take defaults.
///
/// Returns a null pointer on a null pointer, invalid UTF-8, invalid JSON or a
/// store that cannot be opened.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_tracker_with_config(config_json: *const c_char) -> *mut LocalTracker {
    if config_json.is_null() {
        warn!("Null config pointer passed to create_tracker_with_config");
        return std::ptr::null_mut();
    }

    let json = match unsafe { CStr::from_ptr(config_json).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in config parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match serde_json::from_str::<StoreConfig>(json) {
        Ok(config) => open_tracker(config),
        Err(e) => {
            warn!("Invalid tracker config: {e}");
            std::ptr::null_mut()
        }
    }
}

fn open_tracker(config: StoreConfig) -> *mut LocalTracker {
    match LmdbStorage::open(&config) {
        Ok(storage) => {
            let tracker = PainTracker::open(storage);
            info!(
                "✅ Tracker opened at {} ({} entries, status {:?})",
                config.path,
                tracker.entries().len(),
                tracker.migration_status()
            );
            Box::into_raw(Box::new(tracker))
        }
        Err(e) => {
            warn!("❌ Failed to open tracker store: {e}");
            warn!("Attempted path: {}", config.environment_dir().display());
            std::ptr::null_mut()
        }
    }
}

/// Returns the tracker status as JSON inside an `Ok` envelope:
///
/// ```json
/// {
///   "migrationStatus": "needs-migration",
///   "noticeVisible": true,
///   "migrationSummary": {
///     "needsMigration": true,
///     "legacyEntryCount": 3,
///     "modernEntryCount": 0,
///     "totalRegions": 5,
///     "estimatedNewRegions": 9
///   },
///   "entryCount": 3
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_migration_status(state: *mut LocalTracker) -> *const c_char {
    let tracker = match tracker_ref(state, "get_migration_status") {
        Ok(tracker) => tracker,
        Err(error_ptr) => return error_ptr,
    };

    response_to_c_string(&AppResponse::json(&tracker.status()))
}

/// Runs the user-approved migration and returns the resulting status.
///
/// A failed migration still answers `Ok`: the status reads `error` and carries
/// the message, and the stored data is unchanged.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn perform_migration(state: *mut LocalTracker) -> *const c_char {
    let tracker = match tracker_mut(state, "perform_migration") {
        Ok(tracker) => tracker,
        Err(error_ptr) => return error_ptr,
    };

    tracker.perform_migration();
    response_to_c_string(&AppResponse::json(&tracker.status()))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn dismiss_migration_notice(state: *mut LocalTracker) -> *const c_char {
    let tracker = match tracker_mut(state, "dismiss_migration_notice") {
        Ok(tracker) => tracker,
        Err(error_ptr) => return error_ptr,
    };

    tracker.dismiss_notification();
    tracker.clear_error();
    response_to_c_string(&AppResponse::success("Migration notice dismissed"))
}

/// Puts back the snapshot taken before this session's migration.
///
/// Returns `NotFound` when no migration ran in this session.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn restore_backup(state: *mut LocalTracker) -> *const c_char {
    let tracker = match tracker_mut(state, "restore_backup") {
        Ok(tracker) => tracker,
        Err(error_ptr) => return error_ptr,
    };

    match tracker.restore_backup() {
        Ok(_) => response_to_c_string(&AppResponse::json(&tracker.status())),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Records a rating and returns the updated day.
///
/// # JSON Format
///
/// ```json
/// { "bodyPartId": "shoulder_left_superior", "intensityLevel": 7, "painType": "sharp" }
/// ```
///
/// `date` (`YYYY-MM-DD`) is optional and defaults to today; `painType` is
/// optional.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn record_pain(state: *mut LocalTracker, json_ptr: *const c_char) -> *const c_char {
    let tracker = match tracker_mut(state, "record_pain") {
        Ok(tracker) => tracker,
        Err(error_ptr) => return error_ptr,
    };

    let request: RatingRequest = match parse_request(json_ptr) {
        Ok(request) => request,
        Err(error_ptr) => return error_ptr,
    };

    let level = match intensity_from_request(request.intensity_level) {
        Ok(level) => level,
        Err(error_ptr) => return error_ptr,
    };

    let result = match &request.date {
        Some(date) => tracker.record_pain_on(date, &request.body_part_id, level, request.pain_type),
        None => tracker.record_pain(&request.body_part_id, level, request.pain_type),
    };

    match result {
        Ok(entry) => response_to_c_string(&AppResponse::json(&entry)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Replaces a rating on an existing day. Same JSON as [`record_pain`] with
/// `date` required; `NotFound` if the day has no entry.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_pain(state: *mut LocalTracker, json_ptr: *const c_char) -> *const c_char {
    let tracker = match tracker_mut(state, "update_pain") {
        Ok(tracker) => tracker,
        Err(error_ptr) => return error_ptr,
    };

    let request: RatingRequest = match parse_request(json_ptr) {
        Ok(request) => request,
        Err(error_ptr) => return error_ptr,
    };

    let Some(date) = request.date.as_deref() else {
        let error = AppResponse::BadRequest("update_pain requires a date".to_string());
        return response_to_c_string(&error);
    };

    let level = match intensity_from_request(request.intensity_level) {
        Ok(level) => level,
        Err(error_ptr) => return error_ptr,
    };

    match tracker.update_pain(date, &request.body_part_id, level, request.pain_type) {
        Ok(entry) => response_to_c_string(&AppResponse::json(&entry)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Removes one rating: `{"date":"2024-01-15","bodyPartId":"knee_left_medial"}`.
///
/// Answers with the remaining day, or `null` when that was its last rating
/// and the day was deleted.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn remove_pain(state: *mut LocalTracker, json_ptr: *const c_char) -> *const c_char {
    let tracker = match tracker_mut(state, "remove_pain") {
        Ok(tracker) => tracker,
        Err(error_ptr) => return error_ptr,
    };

    let request: RemovalRequest = match parse_request(json_ptr) {
        Ok(request) => request,
        Err(error_ptr) => return error_ptr,
    };

    match tracker.remove_pain(&request.date, &request.body_part_id) {
        Ok(remaining) => response_to_c_string(&AppResponse::json(&remaining)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_day(state: *mut LocalTracker, date: *const c_char) -> *const c_char {
    let tracker = match tracker_mut(state, "delete_day") {
        Ok(tracker) => tracker,
        Err(error_ptr) => return error_ptr,
    };

    let date_str = match c_ptr_to_string(date, "date") {
        Ok(date) => date,
        Err(error_ptr) => return error_ptr,
    };

    match tracker.delete_day(&date_str) {
        Ok(true) => response_to_c_string(&AppResponse::success("Entry deleted successfully")),
        Ok(false) => {
            let not_found = AppResponse::NotFound(format!("No entry found for date {date_str}"));
            response_to_c_string(&not_found)
        }
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_entry_by_date(state: *mut LocalTracker, date: *const c_char) -> *const c_char {
    let tracker = match tracker_ref(state, "get_entry_by_date") {
        Ok(tracker) => tracker,
        Err(error_ptr) => return error_ptr,
    };

    let date_str = match c_ptr_to_string(date, "date") {
        Ok(date) => date,
        Err(error_ptr) => return error_ptr,
    };

    match tracker.entry_by_date(&date_str) {
        Some(entry) => response_to_c_string(&AppResponse::json(entry)),
        None => {
            let error = AppResponse::NotFound(format!("No entry found for date {date_str}"));
            response_to_c_string(&error)
        }
    }
}

/// Every day as a JSON array, newest first.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_all_entries(state: *mut LocalTracker) -> *const c_char {
    let tracker = match tracker_ref(state, "get_all_entries") {
        Ok(tracker) => tracker,
        Err(error_ptr) => return error_ptr,
    };

    response_to_c_string(&AppResponse::json(&tracker.all_entries()))
}

/// Flushes the store and releases the tracker. The handle must not be used
/// afterwards.
///
/// Particularly useful before a Flutter hot restart, so the LMDB environment
/// is closed before the next [`create_tracker`] reopens it.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_tracker(state: *mut LocalTracker) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_tracker".to_string());
        return response_to_c_string(&error);
    }

    let tracker = unsafe { Box::from_raw(state) };
    let flushed = tracker.storage().flush();
    drop(tracker);

    match flushed {
        Ok(()) => response_to_c_string(&AppResponse::success("Tracker closed successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Releases a string returned by any function of this library.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(ptr));
    }
}

fn tracker_ref<'a>(state: *mut LocalTracker, fn_name: &str) -> Result<&'a LocalTracker, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(tracker) => Ok(tracker),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn tracker_mut<'a>(state: *mut LocalTracker, fn_name: &str) -> Result<&'a mut LocalTracker, *const c_char> {
    match unsafe { state.as_mut() } {
        Some(tracker) => Ok(tracker),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn parse_request<T: for<'de> Deserialize<'de>>(json_ptr: *const c_char) -> Result<T, *const c_char> {
    let json_str = c_ptr_to_string(json_ptr, "JSON")?;

    serde_json::from_str(&json_str).map_err(|e| {
        let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
        response_to_c_string(&error)
    })
}

/// Intensities arrive as JSON numbers; anything but an integer 1–10 is rejected
/// before it is narrowed to `u8`.
fn intensity_from_request(level: f64) -> Result<u8, *const c_char> {
    if !is_valid_intensity_level(level) {
        let error = AppResponse::ValidationError(format!(
            "invalid intensity level {level}, expected an integer from 1 to 10"
        ));
        return Err(response_to_c_string(&error));
    }
    Ok(level as u8)
}

/// Serializes an [`AppResponse`] into a newly allocated C string.
///
/// Returns a null pointer if serialization or C string creation fails.
/// Release the result with [`free_response`].
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust `String`, answering null pointers and
/// invalid UTF-8 with a `BadRequest` response.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
