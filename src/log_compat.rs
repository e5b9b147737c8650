//! Compatibility bridge for the Rust `log` crate.
//!
//! [`HookLogAdapter`] implements `log::Log` by converting each record into a
//! [`LogEntry`] and dispatching it through a [`Logger`], so libraries using
//! the `log` macros reach the same hooks as direct callers. Install it once
//! per process with [`install_global_logger`].
//!
//! Records emitted by this crate are ignored: a hook that warns through `log`
//! must not feed its own warnings back into itself.

use std::sync::Arc;

use log::{Metadata, Record};
use parking_lot::Mutex;
use thiserror::Error;

use crate::level::Level;
use crate::log_entry::{LogEntry, is_own_target, normalise_target};
use crate::logger::Logger;

/// Adapter implementing the Rust `log::Log` trait.
pub struct HookLogAdapter {
    logger: Arc<Logger>,
}

/// Errors raised by [`install_global_logger`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstallError {
    #[error("the hook log bridge is already installed")]
    AlreadyInstalled,
    #[error("a different global Rust logger is already set")]
    LoggerAlreadySet,
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Level::Trace,
            log::Level::Debug => Level::Debug,
            log::Level::Info => Level::Info,
            log::Level::Warn => Level::Warn,
            log::Level::Error => Level::Error,
        }
    }
}

fn is_enabled_by_global_max(level: log::Level) -> bool {
    log::max_level() >= level.to_level_filter()
}

impl HookLogAdapter {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    fn to_entry(record: &Record<'_>) -> LogEntry {
        let mut entry = LogEntry::new(
            &normalise_target(record.target()),
            Level::from(record.level()),
            &record.args().to_string(),
        );
        if let Some(module_path) = record.module_path() {
            entry = entry.with_field("module_path", module_path);
        }
        if let Some(file) = record.file() {
            entry = entry.with_field("file", file);
        }
        if let Some(line) = record.line() {
            entry = entry.with_field("line", line);
        }
        entry
    }
}

impl log::Log for HookLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        is_enabled_by_global_max(metadata.level())
            && !is_own_target(metadata.target())
            && self.logger.is_enabled_for(metadata.level().into())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.logger.log_entry(Self::to_entry(record));
    }

    fn flush(&self) {}
}

/// Set once the bridge owns the global Rust logger.
static INSTALLED: Mutex<bool> = Mutex::new(false);

/// Install a [`HookLogAdapter`] for `logger` as the global Rust logger.
///
/// Only the first successful call installs the bridge. When another crate
/// already set the global logger every call fails with
/// [`InstallError::LoggerAlreadySet`].
pub fn install_global_logger(logger: Arc<Logger>) -> Result<(), InstallError> {
    let mut installed = INSTALLED.lock();
    if *installed {
        return Err(InstallError::AlreadyInstalled);
    }
    log::set_boxed_logger(Box::new(HookLogAdapter::new(logger)))
        .map_err(|_| InstallError::LoggerAlreadySet)?;
    *installed = true;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
