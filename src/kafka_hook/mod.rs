//! Hook publishing formatted log entries to a broker topic.
//!
//! [`KafkaHook`] formats each entry it receives, picks a destination topic
//! and hands the resulting [`PublishMessage`] to its producer:
//!
//! - **Sync** hooks call [`SyncProducer::send_message`] and return any
//!   producer error to the logger unchanged.
//! - **Async** hooks enqueue on [`AsyncProducer::input`]. With a timeout the
//!   enqueue gives up once it expires and the message is dropped; without one
//!   it waits for capacity. Async hooks never report errors.
//!
//! Entries whose access-log flag field holds `true` go to the access-log
//! topic when one is configured. Formatting failures publish an empty payload
//! instead of failing the call.

use std::{sync::Arc, time::Duration};

use crossbeam_channel::{SendTimeoutError, Sender};
use log::{debug, warn};

use crate::{
    formatter::SharedFormatter,
    hook::{Hook, HookError},
    level::Level,
    log_entry::LogEntry,
    producer::{AsyncProducer, PublishMessage, SyncProducer},
    rate_limited_warner::RateLimitedWarner,
};

mod options;


pub use options::{DEFAULT_ACCESS_LOG_FIELD, HookOptions};

/// Producer handle paired with the delivery mode it implies.
#[derive(Clone)]
pub enum DeliveryMode {
    Sync(Arc<dyn SyncProducer>),
    Async(Arc<dyn AsyncProducer>),
}

impl std::fmt::Debug for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Sync(<dyn SyncProducer>)"),
            Self::Async(_) => f.write_str("Async(<dyn AsyncProducer>)"),
        }
    }
}

/// Hook forwarding log entries to a broker producer.
pub struct KafkaHook {
    topic: String,
    access_log_topic: Option<String>,
    access_log_field: String,
    timeout: Option<Duration>,
    levels: Vec<Level>,
    formatter: SharedFormatter,
    mode: DeliveryMode,
    warner: RateLimitedWarner,
}

impl KafkaHook {
    /// Build a hook that delivers each entry before `fire` returns.
    pub fn new_sync(
        topic: impl Into<String>,
        producer: Arc<dyn SyncProducer>,
        options: HookOptions,
    ) -> Self {
        Self::with_mode(topic.into(), DeliveryMode::Sync(producer), options)
    }

    /// Build a hook that enqueues entries on the producer's input.
    pub fn new_async(
        topic: impl Into<String>,
        producer: Arc<dyn AsyncProducer>,
        options: HookOptions,
    ) -> Self {
        Self::with_mode(topic.into(), DeliveryMode::Async(producer), options)
    }

    pub fn with_mode(topic: String, mode: DeliveryMode, options: HookOptions) -> Self {
        Self {
            topic,
            access_log_topic: options.access_log_topic,
            access_log_field: options
                .access_log_field
                .unwrap_or_else(|| DEFAULT_ACCESS_LOG_FIELD.to_owned()),
            timeout: options.timeout.filter(|timeout| !timeout.is_zero()),
            levels: options.levels.unwrap_or_else(|| Level::ALL.to_vec()),
            formatter: options.formatter.unwrap_or_default(),
            mode,
            warner: RateLimitedWarner::default(),
        }
    }

    /// Primary topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn mode(&self) -> &DeliveryMode {
        &self.mode
    }

    /// Topic `entry` would be published to.
    pub fn topic_for(&self, entry: &LogEntry) -> &str {
        match &self.access_log_topic {
            Some(topic) if entry.flag(&self.access_log_field) => topic,
            _ => &self.topic,
        }
    }

    fn payload(&self, entry: &LogEntry) -> Vec<u8> {
        match self.formatter.format(entry) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("KafkaHook: failed to format entry: {err}");
                Vec::new()
            }
        }
    }

    fn enqueue(&self, input: &Sender<PublishMessage>, message: PublishMessage) {
        let outcome = match self.timeout {
            Some(timeout) => input.send_timeout(message, timeout),
            None => input
                .send(message)
                .map_err(|err| SendTimeoutError::Disconnected(err.into_inner())),
        };
        let reason = match outcome {
            Ok(()) => return,
            Err(SendTimeoutError::Timeout(_)) => "queue full",
            Err(SendTimeoutError::Disconnected(_)) => "producer closed",
        };
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            warn!(
                "KafkaHook ({reason}): dropped {count} messages for topic {}",
                self.topic
            );
        });
    }
}

impl Hook for KafkaHook {
    fn levels(&self) -> &[Level] {
        &self.levels
    }

    fn fire(&self, entry: &LogEntry) -> Result<(), HookError> {
        let message = PublishMessage::new(self.topic_for(entry), self.payload(entry));
        match &self.mode {
            DeliveryMode::Sync(producer) => {
                let report = producer.send_message(&message)?;
                debug!(
                    "KafkaHook: delivered to {} partition {} offset {}",
                    message.topic, report.partition, report.offset
                );
                Ok(())
            }
            DeliveryMode::Async(producer) => {
                self.enqueue(producer.input(), message);
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for KafkaHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaHook")
            .field("topic", &self.topic)
            .field("access_log_topic", &self.access_log_topic)
            .field("access_log_field", &self.access_log_field)
            .field("timeout", &self.timeout)
            .field("levels", &self.levels)
            .field("mode", &self.mode)
            .finish()
    }
}
