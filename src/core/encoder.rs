//! Line encoders for log events
//!
//! Two encodings are provided:
//! - Json: one object per line, `level`, `ts`, `caller`, `msg`, then fields.
//!   A field named like one of those keys is written as `fields.<key>`.
//! - Console: tab separated, human-readable, fields as a trailing JSON object

use super::log_event::LogEvent;
use serde_json::{Map, Value};

/// Timestamp layout shared by every encoding: `2006-01-02 15:04:05`
pub const TIMESTAMP_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Keys written by the JSON encoder itself
pub const RESERVED_KEYS: [&str; 4] = ["level", "ts", "caller", "msg"];

/// Prefix given to attached fields whose key is one of [`RESERVED_KEYS`]
pub const RESERVED_KEY_PREFIX: &str = "fields.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Machine-readable JSON object per line
    ///
    /// Example: `{"level":"info","ts":"2025-01-08 10:30:45","caller":"src/main.rs:12","msg":"started","port":8080}`
    #[default]
    Json,

    /// Human-readable console line
    ///
    /// Example: `2025-01-08 10:30:45	INFO	src/main.rs:12	started	{"port":8080}`
    Console { colors: bool },
}

impl Encoding {
    /// Append the encoded event, newline included, to `buf`
    pub fn encode_into(&self, event: &LogEvent, buf: &mut Vec<u8>) {
        match self {
            Encoding::Json => encode_json(event, buf),
            Encoding::Console { colors } => encode_console(event, *colors, buf),
        }
    }

    pub fn encode(&self, event: &LogEvent) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128);
        self.encode_into(event, &mut buf);
        buf
    }

    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Console { .. } => "console",
        }
    }
}

fn encode_json(event: &LogEvent, buf: &mut Vec<u8>) {
    let mut object = Map::new();
    object.insert("level".into(), Value::String(event.level.as_str().into()));
    object.insert(
        "ts".into(),
        Value::String(event.timestamp.format(TIMESTAMP_LAYOUT).to_string()),
    );
    if let Some(caller) = event.caller {
        object.insert("caller".into(), Value::String(caller.to_string()));
    }
    object.insert("msg".into(), Value::String(event.message.clone()));

    for (key, value) in event.fields.iter() {
        let key = if RESERVED_KEYS.contains(&key) {
            format!("{RESERVED_KEY_PREFIX}{key}")
        } else {
            key.to_string()
        };
        object.insert(key, value.to_json_value());
    }

    // Map of strings and JSON values cannot fail to serialize
    let _ = serde_json::to_writer(&mut *buf, &Value::Object(object));
    buf.push(b'\n');
}

fn encode_console(event: &LogEvent, colors: bool, buf: &mut Vec<u8>) {
    let mut line = event.timestamp.format(TIMESTAMP_LAYOUT).to_string();
    line.push('\t');
    line.push_str(&level_label(event, colors));
    if let Some(caller) = event.caller {
        line.push('\t');
        line.push_str(&caller.to_string());
    }
    line.push('\t');
    line.push_str(&event.message);

    if !event.fields.is_empty() {
        line.push('\t');
        line.push_str(&Value::Object(event.fields.to_json_object()).to_string());
    }

    line.push('\n');
    buf.extend_from_slice(line.as_bytes());
}

#[cfg(feature = "console")]
fn level_label(event: &LogEvent, colors: bool) -> String {
    use colored::Colorize;

    let label = event.level.as_upper_str();
    if colors {
        label.color(event.level.color_code()).to_string()
    } else {
        label.to_string()
    }
}

#[cfg(not(feature = "console"))]
fn level_label(event: &LogEvent, _colors: bool) -> String {
    event.level.as_upper_str().to_string()
}
