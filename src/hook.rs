//! Hook trait and the per-level hook registry.

use std::sync::Arc;

use thiserror::Error;

use crate::level::Level;
use crate::log_entry::LogEntry;
use crate::producer::ProducerError;

/// Errors returned when a hook fails to process an entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The producer rejected the message; carried unchanged.
    #[error(transparent)]
    Producer(#[from] ProducerError),
}

/// Callback invoked by a logger for every entry at an accepted level.
///
/// Hooks are `Send + Sync` so a single instance can be fired from any thread
/// that logs.
pub trait Hook: Send + Sync {
    /// Levels this hook wants to receive.
    fn levels(&self) -> &[Level];

    /// Process `entry`.
    fn fire(&self, entry: &LogEntry) -> Result<(), HookError>;
}

/// Hooks grouped by the level they accept.
#[derive(Clone, Default)]
pub struct LevelHooks {
    by_level: [Vec<Arc<dyn Hook>>; Level::ALL.len()],
}

impl LevelHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` for every level it accepts.
    pub fn add(&mut self, hook: Arc<dyn Hook>) {
        for level in hook.levels() {
            let slot = &mut self.by_level[usize::from(u8::from(*level))];
            slot.push(Arc::clone(&hook));
        }
    }

    /// Hooks registered for `level`, in registration order.
    pub fn for_level(&self, level: Level) -> &[Arc<dyn Hook>] {
        &self.by_level[usize::from(u8::from(level))]
    }

    pub fn is_empty(&self) -> bool {
        self.by_level.iter().all(Vec::is_empty)
    }

    /// Fire every hook registered for `entry.level`.
    ///
    /// All hooks run even when one fails; the first error is returned.
    pub fn fire(&self, entry: &LogEntry) -> Result<(), HookError> {
        let mut first_err = None;
        for hook in self.for_level(entry.level) {
            if let Err(err) = hook.fire(entry) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for LevelHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<(Level, usize)> = Level::ALL
            .iter()
            .map(|level| (*level, self.for_level(*level).len()))
            .collect();
        f.debug_struct("LevelHooks")
            .field("hooks", &counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct RecordingHook {
        levels: Vec<Level>,
        seen: Mutex<Vec<String>>,
        fail_with: Option<HookError>,
    }

    impl RecordingHook {
        fn new(levels: &[Level]) -> Self {
            Self {
                levels: levels.to_vec(),
                seen: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }
    }

    impl Hook for RecordingHook {
        fn levels(&self) -> &[Level] {
            &self.levels
        }

        fn fire(&self, entry: &LogEntry) -> Result<(), HookError> {
            self.seen.lock().push(entry.message.clone());
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn hooks_only_receive_their_levels() {
        let errors_only = Arc::new(RecordingHook::new(&[Level::Error]));
        let everything = Arc::new(RecordingHook::new(&Level::ALL));
        let mut hooks = LevelHooks::new();
        hooks.add(errors_only.clone());
        hooks.add(everything.clone());

        hooks
            .fire(&LogEntry::new("app", Level::Info, "info"))
            .expect("fire");
        hooks
            .fire(&LogEntry::new("app", Level::Error, "error"))
            .expect("fire");

        assert_eq!(*errors_only.seen.lock(), vec!["error"]);
        assert_eq!(*everything.seen.lock(), vec!["info", "error"]);
        assert_eq!(hooks.for_level(Level::Error).len(), 2);
    }

    #[test]
    fn failing_hook_does_not_stop_later_hooks() {
        let mut failing = RecordingHook::new(&[Level::Warn]);
        failing.fail_with = Some(ProducerError::Closed.into());
        let failing = Arc::new(failing);
        let after = Arc::new(RecordingHook::new(&[Level::Warn]));
        let mut hooks = LevelHooks::new();
        hooks.add(failing);
        hooks.add(after.clone());

        let err = hooks
            .fire(&LogEntry::new("app", Level::Warn, "w"))
            .expect_err("first error surfaces");
        assert_eq!(err, HookError::Producer(ProducerError::Closed));
        assert_eq!(after.seen.lock().len(), 1);
    }

    #[test]
    fn empty_registry_reports_empty() {
        assert!(LevelHooks::new().is_empty());
    }
}
