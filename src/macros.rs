//! Logging macros with `format!`-style templates.
//!
//! Each macro logs to the process-wide default logger when the first argument
//! is the template, or to the given logger when the template comes second.
//! Arguments are passed through `format_args!`, so a filtered event never
//! renders its message.
//!
//! # Examples
//!
//! ```
//! use fslog::{info, warn, Logger, SharedBuffer};
//!
//! let logger = Logger::new();
//! let buffer = SharedBuffer::new();
//! logger.new_output(buffer.clone());
//!
//! let port = 8080;
//! info!(logger, "listening on port {}", port);
//! warn!(logger, "retry {} of {}", 3, 5);
//!
//! // Default logger
//! info!("service {} ready", "api");
//!
//! assert!(buffer.contents().contains("listening on port 8080"));
//! ```

/// Log at an explicit level.
///
/// ```
/// # use fslog::{Level, Logger};
/// # let logger = Logger::new();
/// use fslog::log;
/// log!(logger, Level::Info, "simple message");
/// log!(logger, Level::Error, "error code: {}", 500);
/// log!(Level::Debug, "to the default logger");
/// ```
#[macro_export]
macro_rules! log {
    ($level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::logger().log($level, format_args!($fmt $(, $arg)*))
    };
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $logger.log($level, format_args!($fmt $(, $arg)*))
    };
}

/// Log a debug-level message.
///
/// ```
/// # use fslog::Logger;
/// # let logger = Logger::new();
/// use fslog::debug;
/// debug!(logger, "counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::debug(format_args!($fmt $(, $arg)*))
    };
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $logger.debug(format_args!($fmt $(, $arg)*))
    };
}

/// Log an info-level message.
///
/// ```
/// # use fslog::Logger;
/// # let logger = Logger::new();
/// use fslog::info;
/// info!(logger, "processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::info(format_args!($fmt $(, $arg)*))
    };
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $logger.info(format_args!($fmt $(, $arg)*))
    };
}

/// Log a warning-level message.
///
/// ```
/// # use fslog::Logger;
/// # let logger = Logger::new();
/// use fslog::warn;
/// warn!(logger, "low disk space");
/// ```
#[macro_export]
macro_rules! warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::warn(format_args!($fmt $(, $arg)*))
    };
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $logger.warn(format_args!($fmt $(, $arg)*))
    };
}

/// Log at Error level.
///
/// Accepted shapes, with or without a leading logger:
/// - nothing: no event
/// - `err = e`: the error and its source chain become the message
/// - `err = e, "template", args..`: the template is the message, the error
///   chain goes to the `err` field
/// - `err = e, values = [a, b, ..]`: the values' `Display` forms joined as
///   `[a b ..]` are the message, the error chain goes to the `err` field
/// - `"template", args..`: plain message
///
/// `e` must be a value whose reference coerces to `&dyn Error`; for a
/// `Box<dyn Error>` pass `err = *boxed`.
///
/// ```
/// # use fslog::Logger;
/// # let logger = Logger::new();
/// use fslog::error;
/// let e = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
/// error!(logger, "failed to connect: {}", "timeout");
/// error!(logger, err = e);
/// error!(logger, err = e, "write {} failed", 5);
/// error!(logger, err = e, values = [5, "retries"]);
/// error!(logger);
/// ```
#[macro_export]
macro_rules! error {
    () => {
        ()
    };
    (err = $err:expr $(,)?) => {
        $crate::error_from(&$err)
    };
    (err = $err:expr, values = [$($value:expr),* $(,)?] $(,)?) => {
        $crate::error_with_values(&$err, &[$(&$value as &dyn ::std::fmt::Display),*])
    };
    (err = $err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::error_with_context(&$err, format_args!($fmt $(, $arg)*))
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::error(format_args!($fmt $(, $arg)*))
    };
    ($logger:expr, err = $err:expr $(,)?) => {
        $logger.error_from(&$err)
    };
    ($logger:expr, err = $err:expr, values = [$($value:expr),* $(,)?] $(,)?) => {
        $logger.error_with_values(&$err, &[$(&$value as &dyn ::std::fmt::Display),*])
    };
    ($logger:expr, err = $err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $logger.error_with_context(&$err, format_args!($fmt $(, $arg)*))
    };
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $logger.error(format_args!($fmt $(, $arg)*))
    };
    ($logger:expr $(,)?) => {{
        let _ = &$logger;
    }};
}
