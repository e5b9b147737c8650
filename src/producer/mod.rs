//! Broker producer capabilities injected into hooks.
//!
//! Hooks never talk to a broker directly. They build a [`PublishMessage`] and
//! hand it to either a [`SyncProducer`], which delivers before returning, or
//! an [`AsyncProducer`], which exposes a bounded input queue drained by the
//! broker client. Partitioning, batching, retries and acknowledgements all
//! live behind these traits.

use std::time::Duration;

use crossbeam_channel::Sender;
use thiserror::Error;

mod channel;
#[cfg(feature = "rdkafka")]
mod kafka_client;
mod memory;
mod worker;

pub use channel::{ChannelProducer, ChannelProducerConfig, DEFAULT_CHANNEL_CAPACITY};
#[cfg(feature = "rdkafka")]
pub use kafka_client::RdKafkaProducer;
pub use memory::{MemoryAsyncProducer, MemoryProducer};

/// Key attached to every message published by a hook.
pub const MESSAGE_KEY: &str = "rust_log";

/// A single message destined for a broker topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishMessage {
    pub topic: String,
    pub key: &'static str,
    pub value: Vec<u8>,
}

impl PublishMessage {
    /// Build a message for `topic` carrying `value` under [`MESSAGE_KEY`].
    pub fn new(topic: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            key: MESSAGE_KEY,
            value,
        }
    }
}

/// Where the broker stored a synchronously delivered message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliveryReport {
    pub partition: i32,
    pub offset: i64,
}

/// Errors reported by producers.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProducerError {
    /// The producer has been shut down.
    #[error("producer is closed")]
    Closed,
    /// The broker or client library rejected the message.
    #[error("broker error: {0}")]
    Broker(String),
    /// Delivery did not complete within the given duration.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Producer that delivers a message before returning.
pub trait SyncProducer: Send + Sync {
    /// Publish `message`, returning where the broker stored it.
    fn send_message(&self, message: &PublishMessage) -> Result<DeliveryReport, ProducerError>;
}

/// Producer fed through a bounded input queue.
///
/// Messages sent on [`input`](AsyncProducer::input) are delivered in the
/// background; callers receive no delivery confirmation.
pub trait AsyncProducer: Send + Sync {
    fn input(&self) -> &Sender<PublishMessage>;
}
