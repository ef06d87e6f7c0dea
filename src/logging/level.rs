//! Severity levels and their console colors

use std::fmt;

use crossterm::style::Color;

/// Severity level of a log line
///
/// Levels do not form a filtering hierarchy: each level has its own isolated
/// sink and logging at one level never suppresses another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Error,
    Warn,
    Http,
    Verbose,
    Debug,
}

impl Level {
    /// All levels, in sink construction order
    pub const ALL: [Level; 6] = [
        Level::Info,
        Level::Error,
        Level::Warn,
        Level::Http,
        Level::Verbose,
        Level::Debug,
    ];

    /// Lowercase name used in rendered lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Http => "http",
            Level::Verbose => "verbose",
            Level::Debug => "debug",
        }
    }

    /// Console color for the level token (rendered bold)
    pub fn color(&self) -> Color {
        match self {
            Level::Info => Color::Green,
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Http => Color::Magenta,
            Level::Verbose => Color::Blue,
            Level::Debug => Color::Cyan,
        }
    }

    /// Position of this level in [`Level::ALL`]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
