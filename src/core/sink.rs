//! Sink trait for log output destinations

use super::{
    encoder::Encoding,
    error::{LoggerError, Result},
    level::{Level, LevelGate},
    log_event::LogEvent,
};
use parking_lot::Mutex;
use std::io::Write;

/// A destination receiving every event that passes its level check.
///
/// Sinks are shared between a logger and the loggers derived from it, so all
/// methods take `&self`; implementations guard their writer internally.
pub trait Sink: Send + Sync {
    fn enabled(&self, level: Level) -> bool;
    fn write(&self, event: &LogEvent) -> Result<()>;
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;
}

/// Sink binding an encoding and a `Write` destination to a level gate.
///
/// Each event is encoded into a buffer first and written with a single
/// `write_all` under the writer lock, so concurrent writes and flushes never
/// interleave partial records.
pub struct WriterSink<W: Write + Send> {
    name: String,
    encoding: Encoding,
    gate: LevelGate,
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W, encoding: Encoding, gate: LevelGate) -> Self {
        Self {
            name: encoding.name().to_string(),
            encoding,
            gate,
            writer: Mutex::new(writer),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn enabled(&self, level: Level) -> bool {
        self.gate.enabled(level)
    }

    fn write(&self, event: &LogEvent) -> Result<()> {
        let encoded = self.encoding.encode(event);
        self.writer
            .lock()
            .write_all(&encoded)
            .map_err(|e| LoggerError::sink(&self.name, format!("write failed: {}", e)))
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| LoggerError::sink(&self.name, format!("flush failed: {}", e)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_sink_respects_gate() {
        let gate = LevelGate::new(Level::Warn);
        let sink = WriterSink::new(Vec::new(), Encoding::Json, gate.clone());

        assert!(!sink.enabled(Level::Info));
        assert!(sink.enabled(Level::Error));

        gate.set(Level::Debug);
        assert!(sink.enabled(Level::Info));
    }

    #[test]
    fn test_writer_sink_writes_whole_lines() {
        let sink = WriterSink::new(Vec::new(), Encoding::Json, LevelGate::default())
            .with_name("memory");
        sink.write(&LogEvent::new(Level::Info, "first")).unwrap();
        sink.write(&LogEvent::new(Level::Warn, "second")).unwrap();
        sink.flush().unwrap();

        let contents = String::from_utf8(sink.writer.lock().clone()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"msg\":\"first\""));
        assert!(lines[1].contains("\"level\":\"warn\""));
        assert_eq!(sink.name(), "memory");
    }

    #[test]
    fn test_writer_sink_reports_write_failure() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }
        }

        let sink = WriterSink::new(Broken, Encoding::Json, LevelGate::default());
        let err = sink.write(&LogEvent::new(Level::Info, "lost")).unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert!(sink.flush().is_err());
    }
}
