//! Leveled logging to console and daily-rotating files
//!
//! Each severity level gets its own isolated sink: levels never filter each
//! other, and all six share one rolling file writer under the configured
//! directory.

mod console;
mod file_writer;
mod level;
mod retention;

pub use level::Level;
pub use retention::{cleanup_old_logs, DEFAULT_RETENTION_DAYS};

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Local;

use crate::config::LogConfig;
use console::ConsoleSink;
use file_writer::RollingFileWriter;

/// Timestamp format used in rendered lines
const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// One severity level's pair of destinations: colorized stdout plus the
/// shared rolling file writer
struct LevelSink {
    level: Level,
    console: ConsoleSink,
    file: Arc<Mutex<RollingFileWriter>>,
}

impl LevelSink {
    /// Render and emit one line, best-effort on both destinations
    fn emit(&self, message: &str) {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

        self.console.write_line(&timestamp, message);

        let line = format!("{} {}: {}", timestamp, self.level.as_str(), message);
        if let Ok(mut writer) = self.file.lock() {
            let _ = writer.write_line(&line);
        }
    }
}

/// Leveled logger writing to stdout and a daily-rotating file
///
/// All six level sinks are built once at construction and reused; `log` and
/// the level-named convenience methods never fail or block on durability.
///
/// # Example
/// ```no_run
/// use vigil::config::LogConfig;
/// use vigil::logging::Logger;
///
/// let logger = Logger::new(LogConfig::default()).unwrap();
/// logger.info("server started");
/// ```
pub struct Logger {
    sinks: [LevelSink; 6],
    file: Arc<Mutex<RollingFileWriter>>,
}

impl Logger {
    /// Build the six level sinks and open the active log segment
    ///
    /// Creates the log directory if needed and deletes segments that have
    /// aged out of the retention window.
    pub fn new(config: LogConfig) -> Result<Self> {
        let writer = RollingFileWriter::open(
            &config.dir,
            config.max_file_size,
            config.retention_days,
        )?;
        let file = Arc::new(Mutex::new(writer));

        let sinks = Level::ALL.map(|level| LevelSink {
            level,
            console: ConsoleSink::new(level),
            file: Arc::clone(&file),
        });

        let logger = Logger { sinks, file };

        if let Ok(removed) = cleanup_old_logs(&config.dir, config.retention_days) {
            if removed > 0 {
                logger.verbose(&format!("Cleaned up {} expired log files", removed));
            }
        }

        Ok(logger)
    }

    /// Emit one line at `level`
    ///
    /// Fire-and-forget: file write failures are swallowed and nothing is
    /// reported back to the caller.
    pub fn log(&self, level: Level, message: &str) {
        self.sinks[level.index()].emit(message);
    }

    /// Log an info message
    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Log an error message
    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    /// Log a warning message
    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    /// Log an http message
    pub fn http(&self, message: &str) {
        self.log(Level::Http, message);
    }

    /// Log a verbose message
    pub fn verbose(&self, message: &str) {
        self.log(Level::Verbose, message);
    }

    /// Log a debug message
    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    /// Path of the segment the next file write will land in
    pub fn current_segment(&self) -> Option<PathBuf> {
        self.file.lock().ok().map(|writer| writer.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use std::fs;
    use tempfile::TempDir;

    fn test_config(dir: &std::path::Path) -> LogConfig {
        LogConfig {
            dir: dir.to_path_buf(),
            ..LogConfig::default()
        }
    }

    fn read_current_segment(logger: &Logger) -> String {
        fs::read_to_string(logger.current_segment().unwrap()).unwrap()
    }

    #[test]
    fn test_line_format() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::new(test_config(temp_dir.path())).unwrap();

        logger.info("server started");

        let content = read_current_segment(&logger);
        let line = content.lines().next().unwrap();

        // "DD-MM-YYYY HH:mm:ss info: server started"
        let (timestamp, rest) = line.split_at(19);
        assert!(NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(rest, " info: server started");
    }

    #[test]
    fn test_every_level_appends_to_same_day_file() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::new(test_config(temp_dir.path())).unwrap();

        for level in Level::ALL {
            logger.log(level, "same message");
        }

        let content = read_current_segment(&logger);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 6);
        for (line, level) in lines.iter().zip(Level::ALL) {
            assert!(line.ends_with(&format!(" {}: same message", level.as_str())));
        }
    }

    #[test]
    fn test_named_methods_use_their_level() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::new(test_config(temp_dir.path())).unwrap();

        logger.http("GET /health");
        logger.warn("disk almost full");

        let content = read_current_segment(&logger);
        assert!(content.contains(" http: GET /health\n"));
        assert!(content.contains(" warn: disk almost full\n"));
    }

    #[test]
    fn test_segment_file_named_by_date() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::new(test_config(temp_dir.path())).unwrap();

        logger.info("hello");

        let expected = temp_dir
            .path()
            .join(format!("{}.log", Local::now().format("%Y-%m-%d")));
        assert!(expected.exists());
    }

    #[test]
    fn test_log_swallows_write_failures() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("logs");
        let config = LogConfig {
            dir: dir.clone(),
            max_file_size: 8,
            retention_days: DEFAULT_RETENTION_DAYS,
        };
        let logger = Logger::new(config).unwrap();

        logger.info("fills the first segment");

        // Replace the log directory with a plain file so the next roll
        // cannot open a segment
        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, "not a directory").unwrap();

        // Must not panic or surface the failure
        logger.info("this write has nowhere to go");
    }

    #[test]
    fn test_file_output_is_uncolored() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::new(test_config(temp_dir.path())).unwrap();

        logger.error("plain text only");

        let content = read_current_segment(&logger);
        assert!(!content.contains('\u{1b}'));
    }
}
