//! Process-wide default logger
//!
//! The default logger is built on first use with a single console output at
//! level Debug. The free functions in this module (re-exported at the crate
//! root) delegate to whichever logger is currently installed, so
//! [`set_logger`] takes effect for every later call in every thread.
//!
//! ```
//! use fslog::{Level, Logger, SharedBuffer};
//!
//! let buffer = SharedBuffer::new();
//! let logger = Logger::builder().level(Level::Info).output(buffer.clone()).build();
//! fslog::set_logger(logger);
//!
//! fslog::info("service started");
//! fslog::with("port", 8080).info("listening");
//! assert_eq!(buffer.lines().len(), 2);
//! ```

use crate::core::{FieldValue, FileOutputConfig, Level, Logger, Result, Sink};
use arc_swap::ArcSwap;
use std::fmt;
use std::io::Write;
use std::sync::{Arc, LazyLock};

static DEFAULT_LOGGER: LazyLock<ArcSwap<Logger>> =
    LazyLock::new(|| ArcSwap::from_pointee(default_logger()));

#[cfg(feature = "console")]
fn default_logger() -> Logger {
    Logger::builder().level(Level::Debug).console().build()
}

#[cfg(not(feature = "console"))]
fn default_logger() -> Logger {
    use crate::core::{Encoding, WriterSink};

    let logger = Logger::new();
    let sink = WriterSink::new(
        std::io::stdout(),
        Encoding::Console { colors: false },
        logger.level_gate().clone(),
    )
    .with_name("console");
    logger.add_sink(Arc::new(sink));
    logger
}

/// The installed default logger
pub fn logger() -> Arc<Logger> {
    DEFAULT_LOGGER.load_full()
}

/// Replace the default logger for every subsequent package-level call.
///
/// Calls already in flight finish against the logger they started with.
pub fn set_logger(logger: Logger) {
    DEFAULT_LOGGER.store(Arc::new(logger));
}

/// See [`Logger::with`]
pub fn with<K, V>(key: K, value: V) -> Logger
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    DEFAULT_LOGGER.load().with(key, value)
}

/// See [`Logger::debug`]
#[track_caller]
pub fn debug(message: impl fmt::Display) {
    DEFAULT_LOGGER.load().debug(message);
}

/// See [`Logger::info`]
#[track_caller]
pub fn info(message: impl fmt::Display) {
    DEFAULT_LOGGER.load().info(message);
}

/// See [`Logger::warn`]
#[track_caller]
pub fn warn(message: impl fmt::Display) {
    DEFAULT_LOGGER.load().warn(message);
}

/// See [`Logger::error`]
#[track_caller]
pub fn error(message: impl fmt::Display) {
    DEFAULT_LOGGER.load().error(message);
}

/// See [`Logger::error_from`]
#[track_caller]
pub fn error_from(err: &(dyn std::error::Error + 'static)) {
    DEFAULT_LOGGER.load().error_from(err);
}

/// See [`Logger::error_with_context`]
#[track_caller]
pub fn error_with_context(err: &(dyn std::error::Error + 'static), message: impl fmt::Display) {
    DEFAULT_LOGGER.load().error_with_context(err, message);
}

/// See [`Logger::error_with_values`]
#[track_caller]
pub fn error_with_values(err: &(dyn std::error::Error + 'static), values: &[&dyn fmt::Display]) {
    DEFAULT_LOGGER.load().error_with_values(err, values);
}

pub fn level() -> Level {
    DEFAULT_LOGGER.load().level()
}

pub fn set_level(level: Level) {
    DEFAULT_LOGGER.load().set_level(level);
}

/// See [`Logger::new_output`]
pub fn new_output<W>(writer: W)
where
    W: Write + Send + 'static,
{
    DEFAULT_LOGGER.load().new_output(writer);
}

/// See [`Logger::new_file_output`]
///
/// # Errors
///
/// Returns an error if the log directory or file cannot be created.
pub fn new_file_output(config: FileOutputConfig) -> Result<()> {
    DEFAULT_LOGGER.load().new_file_output(config)
}

/// See [`Logger::add_sink`]
pub fn add_sink(sink: Arc<dyn Sink>) {
    DEFAULT_LOGGER.load().add_sink(sink);
}

/// See [`Logger::flush`]
#[track_caller]
pub fn flush() {
    DEFAULT_LOGGER.load().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logger_has_console_output() {
        let logger = default_logger();
        assert_eq!(logger.level(), Level::Debug);
        assert_eq!(logger.sink_count(), 1);
        assert!(logger.enabled(Level::Debug));
    }
}
