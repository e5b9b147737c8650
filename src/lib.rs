//! Logging hook that forwards formatted log entries to a message broker.
//!
//! A [`Logger`] dispatches each [`LogEntry`] to the hooks registered for its
//! level. [`KafkaHook`] formats the entry and publishes it to a topic through
//! an injected producer, either synchronously or through a bounded queue.
//! The `log` and `tracing` bridges let existing instrumentation reach the
//! same hooks.

mod file_config;
mod formatter;
mod hook;
mod kafka_hook;
mod level;
mod log_entry;
mod logger;
mod producer;
pub mod rate_limited_warner;

#[cfg(feature = "log-compat")]
mod log_compat;
#[cfg(feature = "tracing-compat")]
mod tracing_layer;

pub use file_config::{ConfigError, DeliveryKind, FormatterKind, HookConfig};
pub use formatter::{
    EntryFormatter, FormatError, JsonFormatter, MessagePackFormatter, SharedFormatter,
    TextFormatter,
};
pub use hook::{Hook, HookError, LevelHooks};
pub use kafka_hook::{DEFAULT_ACCESS_LOG_FIELD, DeliveryMode, HookOptions, KafkaHook};
pub use level::{Level, ParseLevelError};
pub use log_entry::{Fields, LogEntry};
pub use logger::{EntryBuilder, Logger};
#[cfg(feature = "rdkafka")]
pub use producer::RdKafkaProducer;
pub use producer::{
    AsyncProducer, ChannelProducer, ChannelProducerConfig, DEFAULT_CHANNEL_CAPACITY,
    DeliveryReport, MESSAGE_KEY, MemoryAsyncProducer, MemoryProducer, ProducerError,
    PublishMessage, SyncProducer,
};

#[cfg(feature = "log-compat")]
pub use log_compat::{HookLogAdapter, InstallError, install_global_logger};
#[cfg(feature = "tracing-compat")]
pub use tracing_layer::HookLayer;
