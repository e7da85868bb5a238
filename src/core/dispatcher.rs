//! Immutable fan-out of events to a fixed set of sinks
//!
//! A `Dispatcher` is never mutated after construction. Loggers build a new one
//! on every reconfiguration and swap it in atomically, so a log call that has
//! loaded a dispatcher keeps a consistent view of sinks, caller skip and
//! fields until it returns.

use super::{
    error::LoggerError, field::Fields, level::Level, log_event::Caller, log_event::LogEvent,
    metrics::LoggerMetrics, options::CallerSkip, sink::Sink,
};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::Arc;

pub struct Dispatcher {
    sinks: Vec<Arc<dyn Sink>>,
    caller: CallerSkip,
    fields: Fields,
    metrics: Arc<LoggerMetrics>,
}

impl Dispatcher {
    pub(crate) fn new(
        sinks: Vec<Arc<dyn Sink>>,
        caller: CallerSkip,
        fields: Fields,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        Self {
            sinks,
            caller,
            fields,
            metrics,
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn caller(&self) -> CallerSkip {
        self.caller
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Whether any sink would accept an event at `level`
    pub fn enabled(&self, level: Level) -> bool {
        self.sinks.iter().any(|sink| sink.enabled(level))
    }

    /// Build the event and hand it to every sink that accepts its level.
    ///
    /// **Per-sink isolation**: each write runs under `catch_unwind`; a sink
    /// that errors or panics is reported on stderr and the remaining sinks
    /// still receive the event.
    pub(crate) fn dispatch(
        &self,
        level: Level,
        message: String,
        extra: Option<&Fields>,
        location: &'static Location<'static>,
    ) {
        let caller = match self.caller {
            CallerSkip::Internal => Location::caller(),
            CallerSkip::CallSite => location,
        };

        let mut fields = self.fields.clone();
        if let Some(extra) = extra {
            fields.extend_from(extra);
        }

        let event = LogEvent::new(level, message)
            .with_caller(Caller::from_location(caller))
            .with_fields(fields);

        let mut has_error = false;
        for (idx, sink) in self.sinks.iter().enumerate() {
            if !sink.enabled(level) {
                continue;
            }

            match panic::catch_unwind(AssertUnwindSafe(|| sink.write(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Sink #{} ({}) failed: {}", idx, sink.name(), e);
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Sink #{} ({}) panicked: {}. \
                         Other sinks continue to function.",
                        idx,
                        sink.name(),
                        panic_message(panic_info.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            self.metrics.record_failed();
        } else {
            self.metrics.record_logged();
        }
    }

    /// Flush every sink, collecting the failures instead of stopping at the first
    pub(crate) fn flush(&self) -> Vec<LoggerError> {
        let mut failures = Vec::new();
        for sink in &self.sinks {
            match panic::catch_unwind(AssertUnwindSafe(|| sink.flush())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => failures.push(e),
                Err(panic_info) => failures.push(LoggerError::sink(
                    sink.name(),
                    format!("panicked during flush: {}", panic_message(panic_info.as_ref())),
                )),
            }
        }
        for _ in &failures {
            self.metrics.record_flush_failure();
        }
        failures
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field(
                "sinks",
                &self.sinks.iter().map(|s| s.name().to_string()).collect::<Vec<_>>(),
            )
            .field("caller", &self.caller)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Extract the message carried by a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
