//! Colorized stdout sink

use std::io::{self, Write};

use crossterm::style::Stylize;

use super::level::Level;

/// Writes rendered lines to stdout with the level token colorized
///
/// Colors are always emitted, even when stdout is redirected to a file or
/// pipe.
pub(crate) struct ConsoleSink {
    level: Level,
}

impl ConsoleSink {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Write one line, best-effort: the level token is bold in the level's
    /// color, timestamp and message are left unstyled
    pub fn write_line(&self, timestamp: &str, message: &str) {
        let token = self.level.as_str().with(self.level.color()).bold();
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{} {}: {}", timestamp, token, message);
    }
}
