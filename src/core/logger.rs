//! Main logger implementation

use super::{
    dispatcher::Dispatcher,
    encoder::Encoding,
    error::{render_chain, Result},
    field::{FieldValue, Fields},
    level::{Level, LevelGate},
    metrics::LoggerMetrics,
    options::{CallerSkip, FileOutputConfig, LoggerOptions},
    sink::{Sink, WriterSink},
};
use crate::appenders::RotatingFileWriter;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::panic::Location;
use std::sync::Arc;

/// A logger whose outputs can be added at runtime while other threads log.
///
/// All configuration lives in an immutable [`Dispatcher`] that is rebuilt and
/// swapped in on every change. Log calls load the installed dispatcher once
/// and never wait on reconfiguration; reconfiguration is serialized by the
/// sink list mutex.
///
/// The level gate is shared with every logger derived through [`Logger::with`],
/// so [`Logger::set_level`] on a parent applies to its children too.
///
/// # Example
///
/// ```
/// use fslog::{Level, Logger, SharedBuffer};
///
/// let logger = Logger::new();
/// let buffer = SharedBuffer::new();
/// logger.new_output(buffer.clone());
///
/// logger.with("user", "alice").info("logged in");
/// logger.set_level(Level::Warn);
/// logger.info("dropped");
///
/// let out = buffer.contents();
/// assert!(out.contains(r#""user":"alice""#));
/// assert!(!out.contains("dropped"));
/// ```
pub struct Logger {
    dispatcher: ArcSwap<Dispatcher>,
    sinks: Mutex<Vec<Arc<dyn Sink>>>,
    gate: LevelGate,
    options: LoggerOptions,
    fields: Fields,
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    /// Logger with default options, level Debug and no sinks
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(LoggerOptions::default())
    }

    #[must_use]
    pub fn with_options(options: LoggerOptions) -> Self {
        Self::from_parts(
            Vec::new(),
            LevelGate::new(Level::Debug),
            options,
            Fields::new(),
            Arc::new(LoggerMetrics::new()),
        )
    }

    fn from_parts(
        sinks: Vec<Arc<dyn Sink>>,
        gate: LevelGate,
        options: LoggerOptions,
        fields: Fields,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        let dispatcher = Dispatcher::new(
            sinks.clone(),
            options.caller,
            fields.clone(),
            Arc::clone(&metrics),
        );
        Self {
            dispatcher: ArcSwap::from_pointee(dispatcher),
            sinks: Mutex::new(sinks),
            gate,
            options,
            fields,
            metrics,
        }
    }

    /// Derive a logger that adds `key = value` to every event it emits.
    ///
    /// The derived logger shares this logger's sinks, level gate and metrics,
    /// and starts from a snapshot of its sink list: outputs added afterwards
    /// to either logger are not seen by the other. `self` is not modified.
    #[must_use]
    pub fn with<K, V>(&self, key: K, value: V) -> Logger
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut fields = self.fields.clone();
        fields.push(key, value);
        let sinks = self.sinks.lock().clone();
        Self::from_parts(
            sinks,
            self.gate.clone(),
            self.options.clone(),
            fields,
            Arc::clone(&self.metrics),
        )
    }

    /// Log `message` verbatim at `level`.
    ///
    /// The message is only rendered when the level gate admits the event, so
    /// passing `format_args!` costs nothing for filtered events.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        self.log_fields(level, message, None);
    }

    #[track_caller]
    fn log_fields(&self, level: Level, message: impl fmt::Display, extra: Option<&Fields>) {
        if !self.gate.enabled(level) {
            return;
        }

        let dispatcher = self.dispatcher.load();
        dispatcher.dispatch(level, message.to_string(), extra, Location::caller());
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, message);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, message);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::Warn, message);
    }

    /// Log a plain or formatted message at Error level
    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, message);
    }

    /// Log an error value at Error level.
    ///
    /// The message is the error followed by its whole `source()` chain.
    #[track_caller]
    pub fn error_from(&self, err: &(dyn std::error::Error + 'static)) {
        if !self.gate.enabled(Level::Error) {
            return;
        }
        self.log_fields(Level::Error, render_chain(err), None);
    }

    /// Log `message` at Error level with the rendered error chain attached
    /// as the `err` field.
    #[track_caller]
    pub fn error_with_context(
        &self,
        err: &(dyn std::error::Error + 'static),
        message: impl fmt::Display,
    ) {
        if !self.gate.enabled(Level::Error) {
            return;
        }
        let extra = Fields::new().with_field("err", render_chain(err));
        self.log_fields(Level::Error, message, Some(&extra));
    }

    /// Log arbitrary values as one Error entry, rendered `[v1 v2 ...]` with
    /// each value's `Display`, and the error chain as the `err` field.
    #[track_caller]
    pub fn error_with_values(
        &self,
        err: &(dyn std::error::Error + 'static),
        values: &[&dyn fmt::Display],
    ) {
        if !self.gate.enabled(Level::Error) {
            return;
        }
        let rendered = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.error_with_context(err, format_args!("[{}]", rendered));
    }

    /// Current threshold
    pub fn level(&self) -> Level {
        self.gate.get()
    }

    /// Change the threshold for this logger and every logger sharing its gate
    pub fn set_level(&self, level: Level) {
        self.gate.set(level);
    }

    /// Whether an event at `level` would currently be emitted
    pub fn enabled(&self, level: Level) -> bool {
        self.gate.enabled(level) && self.dispatcher.load().enabled(level)
    }

    /// Add a JSON output writing to `writer`, bound to this logger's gate
    pub fn new_output<W>(&self, writer: W)
    where
        W: Write + Send + 'static,
    {
        let sink = WriterSink::new(writer, Encoding::Json, self.gate.clone());
        self.add_sink(Arc::new(sink));
    }

    /// Add a JSON output to a rotating file.
    ///
    /// # Errors
    ///
    /// Returns an error if the log directory or file cannot be created.
    pub fn new_file_output(&self, config: FileOutputConfig) -> Result<()> {
        let writer = RotatingFileWriter::open(config)?;
        let name = format!("file:{}", writer.path().display());
        let sink = WriterSink::new(writer, Encoding::Json, self.gate.clone()).with_name(name);
        self.add_sink(Arc::new(sink));
        Ok(())
    }

    /// Add a custom sink and rebuild the dispatcher.
    ///
    /// Returns once the new dispatcher is installed: every log call that
    /// starts afterwards reaches the new sink.
    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        self.sinks.lock().push(sink);
        self.rebuild();
    }

    /// Construct a dispatcher from the current sink list and swap it in
    fn rebuild(&self) {
        let sinks = self.sinks.lock();
        let dispatcher = Dispatcher::new(
            sinks.clone(),
            self.options.caller,
            self.fields.clone(),
            Arc::clone(&self.metrics),
        );
        self.dispatcher.store(Arc::new(dispatcher));
    }

    /// Flush every sink.
    ///
    /// Failures are not returned; each one is logged at Warn level with the
    /// failure attached as the `err` field.
    #[track_caller]
    pub fn flush(&self) {
        let failures = self.dispatcher.load().flush();
        for failure in failures {
            self.with("err", failure.to_string())
                .warn("flush logger error");
        }
    }

    pub fn options(&self) -> &LoggerOptions {
        &self.options
    }

    /// Fields attached through [`Logger::with`]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.lock().len()
    }

    /// Handle to the shared level gate
    pub fn level_gate(&self) -> &LevelGate {
        &self.gate
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use fslog::{Logger, SharedBuffer};
    ///
    /// let logger = Logger::new();
    /// logger.new_output(SharedBuffer::new());
    /// logger.info("counted");
    ///
    /// assert_eq!(logger.metrics().total_logged(), 1);
    /// assert_eq!(logger.metrics().failed_count(), 0);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("options", &self.options)
            .field("fields", &self.fields)
            .field("dispatcher", &**self.dispatcher.load())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use fslog::{CallerSkip, Level, Logger, SharedBuffer};
///
/// let buffer = SharedBuffer::new();
/// let logger = Logger::builder()
///     .level(Level::Info)
///     .caller(CallerSkip::CallSite)
///     .output(buffer.clone())
///     .build();
///
/// logger.debug("filtered");
/// logger.info("kept");
/// assert!(buffer.contents().contains("kept"));
/// assert!(!buffer.contents().contains("filtered"));
/// ```
pub struct LoggerBuilder {
    options: LoggerOptions,
    gate: LevelGate,
    sinks: Vec<Arc<dyn Sink>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            options: LoggerOptions::default(),
            gate: LevelGate::new(Level::Debug),
            sinks: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn options(mut self, options: LoggerOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn caller(mut self, caller: CallerSkip) -> Self {
        self.options.caller = caller;
        self
    }

    /// Set the initial threshold
    #[must_use = "builder methods return a new value"]
    pub fn level(self, level: Level) -> Self {
        self.gate.set(level);
        self
    }

    /// Add a JSON output
    #[must_use = "builder methods return a new value"]
    pub fn output<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        let sink = WriterSink::new(writer, Encoding::Json, self.gate.clone());
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add a console output on stdout
    #[cfg(feature = "console")]
    #[must_use = "builder methods return a new value"]
    pub fn console(mut self) -> Self {
        let sink = crate::appenders::ConsoleSink::new(self.gate.clone());
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add a custom sink
    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        Logger::from_parts(
            self.sinks,
            self.gate,
            self.options,
            Fields::new(),
            Arc::new(LoggerMetrics::new()),
        )
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
