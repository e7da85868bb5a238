//! Log event structure

use super::field::Fields;
use super::level::Level;
use chrono::{DateTime, Local};
use std::panic::Location;

/// Source location a log line is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl Caller {
    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", trim_path(self.file), self.line)
    }
}

/// Shorten a source path to its last two components, `dir/file.rs`.
fn trim_path(file: &str) -> &str {
    let mut separators = file.rmatch_indices(['/', '\\']);
    match (separators.next(), separators.next()) {
        (Some(_), Some((idx, _))) => &file[idx + 1..],
        _ => file,
    }
}

/// One admitted log call, handed to every sink and then dropped
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub caller: Option<Caller>,
    pub fields: Fields,
}

impl LogEvent {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Local::now(),
            caller: None,
            fields: Fields::new(),
        }
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_path() {
        assert_eq!(trim_path("src/core/logger.rs"), "core/logger.rs");
        assert_eq!(trim_path("/home/u/proj/tests/it.rs"), "tests/it.rs");
        assert_eq!(trim_path("lib.rs"), "lib.rs");
        assert_eq!(trim_path("src/lib.rs"), "src/lib.rs");
    }

    #[test]
    fn test_caller_display() {
        let caller = Caller {
            file: "tests/integration_tests.rs",
            line: 42,
        };
        assert_eq!(caller.to_string(), "tests/integration_tests.rs:42");
    }

    #[track_caller]
    fn here() -> Caller {
        Caller::from_location(Location::caller())
    }

    #[test]
    fn test_caller_from_location() {
        let line = line!() + 1;
        let caller = here();
        assert_eq!(caller.line, line);
        assert!(caller.file.ends_with("log_event.rs"));
    }
}
