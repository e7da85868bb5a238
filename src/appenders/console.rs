//! Console sink

use crate::core::{Encoding, Level, LevelGate, LogEvent, Result, Sink, WriterSink};
use std::io::{self, Stdout};

/// Human-readable sink on stdout
pub struct ConsoleSink {
    inner: WriterSink<Stdout>,
}

impl ConsoleSink {
    pub fn new(gate: LevelGate) -> Self {
        Self::with_colors(gate, true)
    }

    pub fn with_colors(gate: LevelGate, use_colors: bool) -> Self {
        let inner = WriterSink::new(io::stdout(), Encoding::Console { colors: use_colors }, gate)
            .with_name("console");
        Self { inner }
    }
}

impl Sink for ConsoleSink {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn write(&self, event: &LogEvent) -> Result<()> {
        self.inner.write(event)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
