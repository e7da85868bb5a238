//! Core logger types and traits

pub mod dispatcher;
pub mod encoder;
pub mod error;
pub mod field;
pub mod level;
pub mod log_event;
pub mod logger;
pub mod metrics;
pub mod options;
pub mod sink;

pub use dispatcher::Dispatcher;
pub use encoder::{Encoding, TIMESTAMP_LAYOUT};
pub use error::{render_chain, LoggerError, Result};
pub use field::{FieldValue, Fields};
pub use level::{Level, LevelGate};
pub use log_event::{Caller, LogEvent};
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use options::{CallerSkip, FileOutputConfig, LoggerOptions, DEFAULT_MAX_SIZE_MB};
pub use sink::{Sink, WriterSink};
