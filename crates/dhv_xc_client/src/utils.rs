//! Date normalization and on-disk naming of downloaded tracks.

use crate::XcError;
use std::path::{Path, PathBuf};

/// Directory used when a flight's date is unknown.
pub const UNDATED_DIR: &str = "today";

/// Normalize a flight date to `YYYY-MM-DD`.
///
/// Accepts:
/// - YYYY-MM-DD
/// - DD.MM.YYYY
/// - YYYY-MM-DD HH:MM:SS and YYYY-MM-DDTHH:MM:SS
/// - RFC3339 datetime
pub fn normalize_flight_date(s: &str) -> Option<String> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d", "%d.%m.%Y"] {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().format("%Y-%m-%d").to_string());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Name of the per-date directory a flight is saved under.
pub fn date_dir_name(raw: &str) -> String {
    if let Some(date) = normalize_flight_date(raw) {
        return date;
    }
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        UNDATED_DIR.to_string()
    } else {
        cleaned
    }
}

/// `<dir>/<date>/<id>.igc`
pub fn igc_file_path(dir: &Path, date: &str, flight_id: &str) -> Result<PathBuf, XcError> {
    let id = flight_id.trim();
    if id.is_empty() {
        return Err(XcError::InvalidInput("flight id is empty".into()));
    }
    if id.contains(['/', '\\']) || id.contains("..") {
        return Err(XcError::InvalidInput(format!(
            "flight id is not a valid file name: {id}"
        )));
    }
    Ok(dir.join(date_dir_name(date)).join(format!("{id}.igc")))
}
