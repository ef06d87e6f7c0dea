//! Static configuration for vigil
//!
//! There is no configuration file: options are set in code, and the defaults
//! match the documented contract (a `logs/` directory next to the process,
//! 20 MB segments, 14 days of retention).

use std::path::PathBuf;

use crate::logging::DEFAULT_RETENTION_DAYS;

/// Size at which a segment rolls over within a day (20 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Default log directory, relative to the working directory
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Options for building a [`Logger`](crate::logging::Logger)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Directory log segments are written to
    pub dir: PathBuf,
    /// Size cap that triggers same-day segment rollover
    pub max_file_size: u64,
    /// Days a segment is kept before deletion
    pub retention_days: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}
