//! Log levels and the shared level gate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    /// All levels, lowest first
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    /// Lowercase name, as written in JSON records
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    /// Uppercase name, as written in console records
    pub fn as_upper_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Level::Debug => Magenta,
            Level::Info => Blue,
            Level::Warn => Yellow,
            Level::Error => Red,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            _ => Level::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Severity threshold shared by a logger, its sinks and every logger derived
/// from it.
///
/// Cloning a `LevelGate` yields another handle to the same threshold, so a
/// `set` through any handle is observed by all of them. Reads and writes are
/// single atomic operations; there is no ordering with log calls already in
/// flight.
#[derive(Debug, Clone)]
pub struct LevelGate {
    level: Arc<AtomicU8>,
}

impl LevelGate {
    pub fn new(level: Level) -> Self {
        Self {
            level: Arc::new(AtomicU8::new(level as u8)),
        }
    }

    #[inline]
    pub fn get(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Whether an event at `level` passes the gate
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.get()
    }

    /// Whether two handles point at the same threshold
    pub fn same_gate(&self, other: &LevelGate) -> bool {
        Arc::ptr_eq(&self.level, &other.level)
    }
}

impl Default for LevelGate {
    fn default() -> Self {
        Self::new(Level::Debug)
    }
}
