//! Minimal hook-dispatching logger.
//!
//! [`Logger`] filters entries by its minimum level and fires every hook
//! registered for the entry's level. It does no output of its own: hooks such
//! as [`KafkaHook`](crate::KafkaHook) decide where entries go.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

// parking_lot avoids poisoning on a panicking hook
use parking_lot::RwLock;
use serde_json::Value;

use crate::hook::{Hook, LevelHooks};
use crate::level::Level;
use crate::log_entry::{Fields, LogEntry};

pub struct Logger {
    name: String,
    level: AtomicU8,
    hooks: RwLock<LevelHooks>,
}

macro_rules! level_methods {
    (owned: $($(#[$meta:meta])* $fn_name:ident => $level:expr),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $fn_name(self, message: &str) {
                self.log($level, message);
            }
        )+
    };
    ($($(#[$meta:meta])* $fn_name:ident => $level:expr),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $fn_name(&self, message: &str) {
                self.log($level, message);
            }
        )+
    };
}

impl Logger {
    /// Create a logger accepting `Info` and above with no hooks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: AtomicU8::new(u8::from(Level::Info)),
            hooks: RwLock::new(LevelHooks::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Update the minimum level. Safe to call while other threads log.
    pub fn set_level(&self, level: Level) {
        self.level.store(u8::from(level), Ordering::Relaxed);
    }

    pub fn level(&self) -> Level {
        Level::try_from(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn is_enabled_for(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Register `hook` for the levels it reports.
    pub fn add_hook(&self, hook: Arc<dyn Hook>) {
        self.hooks.write().add(hook);
    }

    /// Remove every registered hook.
    pub fn clear_hooks(&self) {
        *self.hooks.write() = LevelHooks::new();
    }

    /// Build an entry stamped with this logger's name.
    pub fn entry(&self, level: Level, message: &str) -> LogEntry {
        LogEntry::new(&self.name, level, message)
    }

    /// Start an entry carrying structured fields.
    pub fn with_fields<I, K, V>(&self, fields: I) -> EntryBuilder<'_>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        EntryBuilder {
            logger: self,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Start an entry carrying a single field.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> EntryBuilder<'_> {
        let field: (String, Value) = (key.into(), value.into());
        self.with_fields([field])
    }

    pub fn log(&self, level: Level, message: &str) {
        if self.is_enabled_for(level) {
            self.dispatch(&self.entry(level, message));
        }
    }

    /// Dispatch a pre-built entry, subject to the level threshold.
    pub fn log_entry(&self, entry: LogEntry) {
        if self.is_enabled_for(entry.level) {
            self.dispatch(&entry);
        }
    }

    fn dispatch(&self, entry: &LogEntry) {
        if let Err(err) = self.hooks.read().fire(entry) {
            eprintln!("kafkahook: failed to fire hook for {}: {err}", self.name);
        }
    }

    level_methods!(
        trace => Level::Trace,
        debug => Level::Debug,
        info => Level::Info,
        warn => Level::Warn,
        error => Level::Error,
        /// Dispatch at `Fatal`. The process keeps running.
        fatal => Level::Fatal,
        /// Dispatch at `Panic`. The calling thread does not panic.
        panic => Level::Panic,
    );
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("hooks", &*self.hooks.read())
            .finish()
    }
}

/// Entry under construction with fields attached.
#[must_use = "an entry builder does nothing until a level method is called"]
pub struct EntryBuilder<'a> {
    logger: &'a Logger,
    fields: Fields,
}

impl EntryBuilder<'_> {
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn log(self, level: Level, message: &str) {
        let mut entry = self.logger.entry(level, message);
        entry.fields = self.fields;
        self.logger.log_entry(entry);
    }

    level_methods!(
        owned:
        trace => Level::Trace,
        debug => Level::Debug,
        info => Level::Info,
        warn => Level::Warn,
        error => Level::Error,
        fatal => Level::Fatal,
        panic => Level::Panic,
    );
}
