//! Logger and file output configuration

use super::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default maximum file size, in megabytes, when none is configured
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;

const MEGABYTE: u64 = 1024 * 1024;

/// Which source location a log line is attributed to.
///
/// Attribution follows `#[track_caller]`: functions carrying the attribute
/// are looked through, plain wrapper functions are not. Configuration files
/// spell this as the numeric `skip_caller`, `0` or `1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum CallerSkip {
    /// The dispatch site inside this crate (`skip_caller = 0`)
    Internal,
    /// The first caller outside this crate (`skip_caller = 1`)
    #[default]
    CallSite,
}

impl CallerSkip {
    /// Map a frame count onto an attribution.
    ///
    /// # Errors
    ///
    /// Counts above 1 cannot be honored and are rejected.
    pub fn from_frames(frames: usize) -> Result<Self> {
        match frames {
            0 => Ok(CallerSkip::Internal),
            1 => Ok(CallerSkip::CallSite),
            n => Err(LoggerError::config(
                "skip_caller",
                format!(
                    "{} frames requested; only 0 (internal) and 1 (call site) are supported, \
                     mark wrapper functions #[track_caller] instead",
                    n
                ),
            )),
        }
    }

    pub fn frames(&self) -> usize {
        match self {
            CallerSkip::Internal => 0,
            CallerSkip::CallSite => 1,
        }
    }
}

impl TryFrom<usize> for CallerSkip {
    type Error = LoggerError;

    fn try_from(frames: usize) -> Result<Self> {
        Self::from_frames(frames)
    }
}

impl From<CallerSkip> for usize {
    fn from(skip: CallerSkip) -> usize {
        skip.frames()
    }
}

/// Construction options for a [`Logger`](crate::Logger)
///
/// # Example
///
/// ```
/// use fslog::{CallerSkip, Logger, LoggerOptions};
///
/// let options = LoggerOptions::new().skip_caller(0)?;
/// let logger = Logger::with_options(options);
/// assert_eq!(logger.options().caller, CallerSkip::Internal);
///
/// assert!(LoggerOptions::new().skip_caller(2).is_err());
/// # Ok::<(), fslog::LoggerError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    #[serde(rename = "skip_caller")]
    pub caller: CallerSkip,
}

impl LoggerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn caller(mut self, caller: CallerSkip) -> Self {
        self.caller = caller;
        self
    }

    /// Set attribution from a frame count, `0` or `1`
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] for counts above 1.
    pub fn skip_caller(mut self, frames: usize) -> Result<Self> {
        self.caller = CallerSkip::from_frames(frames)?;
        Ok(self)
    }
}

/// Configuration of a rotating file output
///
/// Zero values fall back to defaults: a `max_size` of 0 means
/// [`DEFAULT_MAX_SIZE_MB`], a `max_age` of 0 disables age-based removal and a
/// `max_backups` of 0 keeps every backup. An empty filename resolves to
/// `<temp dir>/<program>-fslog.log`.
///
/// # Examples
///
/// ```
/// use fslog::FileOutputConfig;
///
/// let config = FileOutputConfig::new("logs/app.log")
///     .with_max_size(50)
///     .with_max_age(7)
///     .with_max_backups(10)
///     .with_local_time(true)
///     .with_compress(true);
/// assert_eq!(config.max_size_bytes(), 50 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Path of the active log file
    pub filename: PathBuf,
    /// Size in megabytes before the file is rotated
    pub max_size: u64,
    /// Days a rotated file is kept
    pub max_age: u32,
    /// Number of rotated files kept
    pub max_backups: usize,
    /// Use local time instead of UTC in backup file names
    pub local_time: bool,
    /// Gzip rotated files
    pub compress: bool,
}

impl FileOutputConfig {
    #[must_use]
    pub fn new(filename: impl AsRef<Path>) -> Self {
        Self {
            filename: filename.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_filename(mut self, filename: impl AsRef<Path>) -> Self {
        self.filename = filename.as_ref().to_path_buf();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, megabytes: u64) -> Self {
        self.max_size = megabytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, days: u32) -> Self {
        self.max_age = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Rotation threshold in bytes
    #[must_use]
    pub fn max_size_bytes(&self) -> u64 {
        let megabytes = if self.max_size == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            self.max_size
        };
        megabytes.saturating_mul(MEGABYTE)
    }

    /// Path actually written to
    #[must_use]
    pub fn resolved_filename(&self) -> PathBuf {
        if !self.filename.as_os_str().is_empty() {
            return self.filename.clone();
        }

        let program = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "app".to_string());
        std::env::temp_dir().join(format!("{}-fslog.log", program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_options_default() {
        assert_eq!(LoggerOptions::default().caller, CallerSkip::CallSite);
        assert_eq!(
            LoggerOptions::new().skip_caller(0).unwrap().caller,
            CallerSkip::Internal
        );
    }

    #[test]
    fn test_skip_caller_rejects_unsupported_counts() {
        let err = LoggerOptions::new().skip_caller(2).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("skip_caller"));
    }

    #[test]
    fn test_logger_options_deserialize() {
        let options: LoggerOptions = serde_json::from_str(r#"{"skip_caller":0}"#).unwrap();
        assert_eq!(options.caller, CallerSkip::Internal);
        assert_eq!(serde_json::to_string(&options).unwrap(), r#"{"skip_caller":0}"#);

        assert!(serde_json::from_str::<LoggerOptions>(r#"{"skip_caller":3}"#).is_err());
        assert_eq!(
            serde_json::from_str::<LoggerOptions>("{}").unwrap().caller,
            CallerSkip::CallSite
        );
    }

    #[test]
    fn test_file_output_defaults() {
        let config = FileOutputConfig::new("logs/test");
        assert_eq!(config.filename, PathBuf::from("logs/test"));
        assert_eq!(config.max_size, 0);
        assert_eq!(config.max_size_bytes(), 100 * 1024 * 1024);
        assert_eq!(config.max_age, 0);
        assert_eq!(config.max_backups, 0);
        assert!(!config.local_time);
        assert!(!config.compress);
    }

    #[test]
    fn test_file_output_builder() {
        let config = FileOutputConfig::default()
            .with_filename("a.log")
            .with_max_size(1)
            .with_max_age(3)
            .with_max_backups(2)
            .with_local_time(true)
            .with_compress(true);

        assert_eq!(config.resolved_filename(), PathBuf::from("a.log"));
        assert_eq!(config.max_size_bytes(), 1024 * 1024);
        assert_eq!(config.max_age, 3);
        assert_eq!(config.max_backups, 2);
        assert!(config.local_time);
        assert!(config.compress);
    }

    #[test]
    fn test_empty_filename_resolves_to_temp_dir() {
        let resolved = FileOutputConfig::default().resolved_filename();
        assert!(resolved.starts_with(std::env::temp_dir()));
        assert!(resolved.to_string_lossy().ends_with("-fslog.log"));
    }

    #[test]
    fn test_file_output_deserialize_partial() {
        let config: FileOutputConfig =
            serde_json::from_str(r#"{"filename":"svc.log","max_backups":3}"#).unwrap();
        assert_eq!(config.filename, PathBuf::from("svc.log"));
        assert_eq!(config.max_backups, 3);
        assert!(!config.compress);
    }
}
