//! Structured formatters backed by serde.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::Value;

use crate::log_entry::LogEntry;

use super::{EntryFormatter, FormatError};

const RESERVED_KEYS: [&str; 4] = ["time", "level", "msg", "logger"];

#[derive(Serialize)]
struct SerializableEntry<'a> {
    time: String,
    level: &'a str,
    msg: &'a str,
    logger: &'a str,
    #[serde(flatten)]
    fields: BTreeMap<Cow<'a, str>, &'a Value>,
}

impl<'a> From<&'a LogEntry> for SerializableEntry<'a> {
    fn from(entry: &'a LogEntry) -> Self {
        let fields = entry
            .fields
            .iter()
            .map(|(key, value)| {
                let key = if RESERVED_KEYS.contains(&key.as_str()) {
                    Cow::Owned(format!("fields.{key}"))
                } else {
                    Cow::Borrowed(key.as_str())
                };
                (key, value)
            })
            .collect();
        Self {
            time: entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            level: entry.level.as_lower_str(),
            msg: &entry.message,
            logger: &entry.logger,
            fields,
        }
    }
}

/// Formats entries as newline-terminated JSON objects.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFormatter;

impl EntryFormatter for JsonFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>, FormatError> {
        let mut buf = serde_json::to_vec(&SerializableEntry::from(entry))?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// Formats entries as MessagePack maps.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessagePackFormatter;

impl EntryFormatter for MessagePackFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>, FormatError> {
        Ok(rmp_serde::to_vec_named(&SerializableEntry::from(entry))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sample() -> LogEntry {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        LogEntry::new("web", Level::Info, "request served")
            .at(ts)
            .with_field("status", 200)
            .with_field("msg", "shadowed")
    }

    #[test]
    fn json_formatter_emits_one_object_per_line() {
        let bytes = JsonFormatter.format(&sample()).expect("format");
        assert_eq!(bytes.last(), Some(&b'\n'));
        let decoded: Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(
            decoded,
            json!({
                "time": "2024-03-01T12:30:00.000Z",
                "level": "info",
                "msg": "request served",
                "logger": "web",
                "status": 200,
                "fields.msg": "shadowed",
            })
        );
    }

    #[test]
    fn msgpack_formatter_round_trips_through_serde() {
        let bytes = MessagePackFormatter.format(&sample()).expect("format");
        let decoded: BTreeMap<String, Value> = rmp_serde::from_slice(&bytes).expect("decode");
        assert_eq!(decoded["msg"], json!("request served"));
        assert_eq!(decoded["status"], json!(200));
        assert_eq!(decoded["fields.msg"], json!("shadowed"));
    }
}
