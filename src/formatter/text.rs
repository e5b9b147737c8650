//! Human-readable `key=value` formatter.

use std::fmt::Write as _;

use chrono::SecondsFormat;
use serde_json::Value;

use crate::log_entry::LogEntry;

use super::{EntryFormatter, FormatError};

/// Formats entries as a single `time=.. level=.. msg=.. key=value` line.
///
/// Fields follow the built-in keys in key order. Values containing
/// characters outside `[A-Za-z0-9-._/@^+]` are quoted and escaped.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextFormatter {
    disable_timestamp: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Omit the `time` key from the output.
    pub fn without_timestamp(mut self) -> Self {
        self.disable_timestamp = true;
        self
    }
}

fn needs_quoting(text: &str) -> bool {
    !text
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+'))
}

fn append_pair(out: &mut String, key: &str, value: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(key);
    out.push('=');
    if needs_quoting(value) {
        // Debug escaping yields a double-quoted literal.
        let _ = write!(out, "{value:?}");
    } else {
        out.push_str(value);
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl EntryFormatter for TextFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>, FormatError> {
        let mut out = String::with_capacity(64 + entry.message.len());
        if !self.disable_timestamp {
            let time = entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
            append_pair(&mut out, "time", &time);
        }
        append_pair(&mut out, "level", entry.level.as_lower_str());
        append_pair(&mut out, "msg", &entry.message);
        for (key, value) in &entry.fields {
            append_pair(&mut out, key, &value_text(value));
        }
        out.push('\n');
        Ok(out.into_bytes())
    }
}
