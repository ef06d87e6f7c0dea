//! Log file retention management
//!
//! Handles cleanup of old log segments based on the date embedded in their
//! filenames.

use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};

/// Default retention period in days
pub const DEFAULT_RETENTION_DAYS: u32 = 14;

/// Clean up log segments older than the specified number of days
///
/// Age is taken from the `YYYY-MM-DD` prefix of the filename, not file
/// metadata, so retention survives copies and clock-skewed restores. Files
/// that do not look like log segments are left alone. Returns the number of
/// files deleted.
pub fn cleanup_old_logs(logs_dir: &Path, retention_days: u32) -> Result<usize> {
    if !logs_dir.exists() {
        return Ok(0);
    }

    let cutoff = Local::now().date_naive() - Duration::days(i64::from(retention_days));

    let mut deleted_count = 0;

    for entry in fs::read_dir(logs_dir)? {
        let entry = entry?;
        let path = entry.path();

        let date = match path.file_name().and_then(|n| n.to_str()).and_then(segment_date) {
            Some(date) => date,
            None => continue,
        };

        if date < cutoff && fs::remove_file(&path).is_ok() {
            deleted_count += 1;
        }
    }

    Ok(deleted_count)
}

/// Parse the date prefix of a segment filename (`YYYY-MM-DD.log` or
/// `YYYY-MM-DD.<n>.log`)
fn segment_date(name: &str) -> Option<NaiveDate> {
    if !name.ends_with(".log") {
        return None;
    }
    let prefix = name.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}
