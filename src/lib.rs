//! # fslog
//!
//! A small structured logging façade: leveled JSON and console outputs,
//! contextual fields, size-rotated log files and HTTP middleware.
//!
//! ## Features
//!
//! - **Runtime outputs**: add destinations while other threads are logging;
//!   log calls never block on reconfiguration
//! - **Contextual fields**: `with(key, value)` derives a logger that tags every event
//! - **Shared level**: one threshold for a logger and everything derived from it
//! - **Rotating files**: size-based rotation with pruning and gzip compression
//! - **HTTP**: actix-web request logging and panic recovery (feature `actix`)
//!
//! ## Quick start
//!
//! ```
//! use fslog::{info, Level, Logger, SharedBuffer};
//!
//! let logger = Logger::new();
//! let buffer = SharedBuffer::new();
//! logger.new_output(buffer.clone());
//!
//! let request = logger.with("request_id", "7f3a");
//! info!(request, "x={}", 3);
//!
//! logger.set_level(Level::Error);
//! request.debug("not emitted");
//!
//! assert_eq!(buffer.lines().len(), 1);
//! ```

pub mod appenders;
pub mod core;
pub mod global;
#[cfg(feature = "actix")]
pub mod http;
pub mod macros;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::appenders::ConsoleSink;
    pub use crate::appenders::{RotatingFileWriter, SharedBuffer};
    pub use crate::core::{
        CallerSkip, FieldValue, Fields, FileOutputConfig, Level, LogEvent, Logger, LoggerBuilder,
        LoggerError, LoggerMetrics, LoggerOptions, Result, Sink, WriterSink,
    };
}

#[cfg(feature = "console")]
pub use appenders::ConsoleSink;
pub use appenders::{RotatingFileWriter, SharedBuffer};
pub use core::{
    render_chain, Caller, CallerSkip, Encoding, FieldValue, Fields, FileOutputConfig, Level,
    LevelGate, LogEvent, Logger, LoggerBuilder, LoggerError, LoggerMetrics, LoggerOptions, Result,
    Sink, WriterSink,
};
pub use global::{
    add_sink, debug, error, error_from, error_with_context, error_with_values, flush, info, level,
    logger, new_file_output, new_output, set_level, set_logger, warn, with,
};
