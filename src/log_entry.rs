//! Log entry representation passed to hooks.
//!
//! A [`LogEntry`] is what the logger hands to every hook registered for its
//! level. Hooks consume it read-only; structured fields are arbitrary JSON
//! values keyed by name.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::level::Level;

/// Module path prefix of records emitted by this crate.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Structured key-value pairs attached to an entry.
pub type Fields = BTreeMap<String, Value>;

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    /// Name of the logger that produced the entry.
    pub logger: String,
    pub level: Level,
    pub message: String,
    /// Time the entry was created.
    pub timestamp: DateTime<Utc>,
    pub fields: Fields,
}

impl LogEntry {
    /// Construct an entry stamped with the current time and no fields.
    pub fn new(logger: &str, level: Level, message: &str) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            timestamp: Utc::now(),
            fields: Fields::new(),
        }
    }

    /// Attach a single field, replacing any previous value under `key`.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Merge `fields` into the entry.
    pub fn with_fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Override the timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Return `true` when `key` holds the JSON boolean `true`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.fields.get(key), Some(Value::Bool(true)))
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}

/// Turn a Rust module path target into a dotted logger name.
#[cfg_attr(
    not(any(feature = "log-compat", feature = "tracing-compat")),
    allow(dead_code, reason = "only the log and tracing bridges map targets")
)]
pub(crate) fn normalise_target(target: &str) -> Cow<'_, str> {
    if target.contains("::") {
        Cow::Owned(target.replace("::", "."))
    } else {
        Cow::Borrowed(target)
    }
}

/// Whether `target` names this crate or one of its modules.
#[cfg_attr(
    not(any(feature = "log-compat", feature = "tracing-compat")),
    allow(dead_code, reason = "only the log and tracing bridges filter targets")
)]
pub(crate) fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}
