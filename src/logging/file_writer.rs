//! Rolling append-only log file writer
//!
//! One segment per calendar day, named by date, with numbered overflow
//! segments when the size cap is reached. Rollover is detected lazily on the
//! next write, so an idle logger never touches the disk.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use super::retention;

/// Append-only writer that rolls segments by calendar day and size
pub(crate) struct RollingFileWriter {
    dir: PathBuf,
    max_size: u64,
    retention_days: u32,
    /// Date the open segment belongs to
    date: NaiveDate,
    /// Overflow index of the open segment (0 = first segment of the day)
    segment: u32,
    /// Bytes in the open segment so far
    size: u64,
    /// Open handle, None after a roll or a failed open
    file: Option<File>,
}

/// Path of segment `index` for `date`
///
/// The first segment of a day is `YYYY-MM-DD.log`; same-day overflow segments
/// are `YYYY-MM-DD.1.log` and up.
pub(crate) fn segment_path(dir: &Path, date: NaiveDate, index: u32) -> PathBuf {
    let stamp = date.format("%Y-%m-%d");
    if index == 0 {
        dir.join(format!("{}.log", stamp))
    } else {
        dir.join(format!("{}.{}.log", stamp, index))
    }
}

impl RollingFileWriter {
    /// Open a writer for `dir`, resuming today's newest segment that is still
    /// below the size cap
    pub fn open(dir: &Path, max_size: u64, retention_days: u32) -> Result<Self> {
        fs::create_dir_all(dir).context("Failed to create log directory")?;

        let today = Local::now().date_naive();
        let mut writer = RollingFileWriter {
            dir: dir.to_path_buf(),
            max_size,
            retention_days,
            date: today,
            segment: 0,
            size: 0,
            file: None,
        };
        writer.segment = writer.first_open_segment(today);
        writer.open_segment()?;
        Ok(writer)
    }

    /// Path of the segment the next write will land in
    pub fn path(&self) -> PathBuf {
        segment_path(&self.dir, self.date, self.segment)
    }

    /// Append one rendered line, rolling the segment first if the date
    /// changed or the size cap would be exceeded
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let today = Local::now().date_naive();
        if today != self.date {
            self.date = today;
            self.segment = 0;
            self.size = 0;
            self.file = None;
            // New day: segments may have aged out of the retention window
            let _ = retention::cleanup_old_logs(&self.dir, self.retention_days);
        }

        let pending = line.len() as u64 + 1;
        if self.file.is_some() && self.size > 0 && self.size + pending > self.max_size {
            self.segment += 1;
            self.size = 0;
            self.file = None;
        }

        if self.file.is_none() {
            self.open_segment()?;
        }

        if let Some(file) = self.file.as_mut() {
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
            self.size += pending;
        }
        Ok(())
    }

    /// First segment index for `date` whose file is still below the size cap
    fn first_open_segment(&self, date: NaiveDate) -> u32 {
        let mut index = 0;
        loop {
            let path = segment_path(&self.dir, date, index);
            match fs::metadata(&path) {
                Ok(meta) if meta.len() >= self.max_size => index += 1,
                _ => return index,
            }
        }
    }

    fn open_segment(&mut self) -> Result<()> {
        let path = segment_path(&self.dir, self.date, self.segment);
        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        self.size = size;
        self.file = Some(file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MAX_SIZE: u64 = 20 * 1024 * 1024;

    #[test]
    fn test_write_creates_dated_segment() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = RollingFileWriter::open(temp_dir.path(), MAX_SIZE, 14).unwrap();

        writer.write_line("first line").unwrap();

        let today = Local::now().date_naive();
        let path = segment_path(temp_dir.path(), today, 0);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first line\n");
    }

    #[test]
    fn test_writes_append_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = RollingFileWriter::open(temp_dir.path(), MAX_SIZE, 14).unwrap();

        writer.write_line("one").unwrap();
        writer.write_line("two").unwrap();
        writer.write_line("three").unwrap();

        let content = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content, "one\ntwo\nthree\n");
    }

    #[test]
    fn test_size_cap_rolls_to_numbered_segment() {
        let temp_dir = TempDir::new().unwrap();
        // Cap small enough that the second write must roll
        let mut writer = RollingFileWriter::open(temp_dir.path(), 16, 14).unwrap();

        writer.write_line("0123456789abcde").unwrap();
        writer.write_line("next segment").unwrap();

        let today = Local::now().date_naive();
        let first = segment_path(temp_dir.path(), today, 0);
        let second = segment_path(temp_dir.path(), today, 1);
        assert_eq!(fs::read_to_string(&first).unwrap(), "0123456789abcde\n");
        assert_eq!(fs::read_to_string(&second).unwrap(), "next segment\n");
    }

    #[test]
    fn test_oversized_line_still_written() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = RollingFileWriter::open(temp_dir.path(), 8, 14).unwrap();

        // A single line above the cap cannot be split; it goes out whole
        writer.write_line("longer than the cap").unwrap();

        let content = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content, "longer than the cap\n");
    }

    #[test]
    fn test_open_resumes_past_full_segments() {
        let temp_dir = TempDir::new().unwrap();
        let today = Local::now().date_naive();

        // Pre-fill the first segment beyond the cap
        fs::write(segment_path(temp_dir.path(), today, 0), "x".repeat(32)).unwrap();

        let writer = RollingFileWriter::open(temp_dir.path(), 16, 14).unwrap();
        assert_eq!(writer.path(), segment_path(temp_dir.path(), today, 1));
    }

    #[test]
    fn test_segment_path_naming() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dir = Path::new("logs");
        assert_eq!(segment_path(dir, date, 0), dir.join("2024-01-01.log"));
        assert_eq!(segment_path(dir, date, 2), dir.join("2024-01-01.2.log"));
    }
}
