//! Formatter implementations turning log entries into broker payloads.
//!
//! Provides the core [`EntryFormatter`] trait alongside [`SharedFormatter`],
//! the dynamically dispatched handle stored by hooks. Formatting is fallible
//! so serialisation-based formatters can report errors; the hook decides what
//! to do with a failure.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::log_entry::LogEntry;

mod serialise;
mod text;

pub use serialise::{JsonFormatter, MessagePackFormatter};
pub use text::TextFormatter;

/// Errors raised while formatting an entry.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("json serialisation failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("messagepack serialisation failed: {0}")]
    MessagePack(#[from] rmp_serde::encode::Error),
    #[error("{0}")]
    Custom(String),
}

/// Trait for formatting log entries into byte payloads.
///
/// Implementors must be thread-safe (`Send + Sync`) so one formatter can be
/// shared by hooks fired from several threads.
pub trait EntryFormatter: Send + Sync {
    /// Format an entry into the bytes published to the broker.
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>, FormatError>;
}

/// Shared formatter trait object used by hooks.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn EntryFormatter>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: EntryFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Wrap an existing shared formatter trait object.
    pub fn from_arc(inner: Arc<dyn EntryFormatter>) -> Self {
        Self { inner }
    }

    pub fn format(&self, entry: &LogEntry) -> Result<Vec<u8>, FormatError> {
        self.inner.format(entry)
    }
}

impl Default for SharedFormatter {
    fn default() -> Self {
        Self::new(TextFormatter::default())
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn EntryFormatter>)")
    }
}

impl EntryFormatter for Arc<dyn EntryFormatter> {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>, FormatError> {
        (**self).format(entry)
    }
}

impl EntryFormatter for Box<dyn EntryFormatter> {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>, FormatError> {
        (**self).format(entry)
    }
}
