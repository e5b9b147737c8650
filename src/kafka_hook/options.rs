//! Construction-time options for [`KafkaHook`](super::KafkaHook).

use std::time::Duration;

use crate::formatter::{EntryFormatter, SharedFormatter};
use crate::level::Level;

/// Field name checked for access-log routing when none is configured.
pub const DEFAULT_ACCESS_LOG_FIELD: &str = "access_log";

/// Optional settings applied when a hook is built.
///
/// Every setting has a default, so `HookOptions::default()` yields a hook
/// that formats with [`TextFormatter`](crate::formatter::TextFormatter),
/// accepts every level, never routes to a secondary topic and enqueues async
/// messages without a timeout.
#[derive(Clone, Debug, Default)]
pub struct HookOptions {
    pub(crate) timeout: Option<Duration>,
    pub(crate) access_log_topic: Option<String>,
    pub(crate) access_log_field: Option<String>,
    pub(crate) levels: Option<Vec<Level>>,
    pub(crate) formatter: Option<SharedFormatter>,
}

impl HookOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound how long an async enqueue may wait for queue capacity.
    ///
    /// A zero duration means no bound. Ignored by sync hooks.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send entries flagged as access logs to `topic`.
    pub fn with_access_log_topic(mut self, topic: impl Into<String>) -> Self {
        self.access_log_topic = Some(topic.into());
        self
    }

    /// Name of the boolean field marking an entry as an access log.
    pub fn with_access_log_field(mut self, field: impl Into<String>) -> Self {
        self.access_log_field = Some(field.into());
        self
    }

    /// Restrict the hook to `levels`.
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = Level>) -> Self {
        self.levels = Some(levels.into_iter().collect());
        self
    }

    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: EntryFormatter + 'static,
    {
        self.formatter = Some(SharedFormatter::new(formatter));
        self
    }

    pub fn with_shared_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }
}
