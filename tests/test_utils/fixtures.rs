//! Shared hooks, formatters and fixtures for integration tests.

use std::sync::Arc;

use kafkahook::{
    EntryFormatter, FormatError, Hook, HookError, HookOptions, Level, LogEntry, MemoryProducer,
    TextFormatter,
};
use parking_lot::Mutex;
use rstest::fixture;

/// Hook recording every entry it receives.
#[derive(Default)]
pub struct CollectingHook {
    entries: Mutex<Vec<LogEntry>>,
}

impl CollectingHook {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.message.clone())
            .collect()
    }
}

impl Hook for CollectingHook {
    fn levels(&self) -> &[Level] {
        &Level::ALL
    }

    fn fire(&self, entry: &LogEntry) -> Result<(), HookError> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }
}

/// Formatter that always fails.
pub struct FailingFormatter;

impl EntryFormatter for FailingFormatter {
    fn format(&self, _entry: &LogEntry) -> Result<Vec<u8>, FormatError> {
        Err(FormatError::Custom("cannot render".into()))
    }
}

#[fixture]
pub fn memory_producer() -> Arc<MemoryProducer> {
    Arc::new(MemoryProducer::new())
}

/// Options producing deterministic text payloads.
pub fn plain_options() -> HookOptions {
    HookOptions::new().with_formatter(TextFormatter::new().without_timestamp())
}
