//! `SyncProducer` implementation for librdkafka via the `rdkafka` crate.

use std::time::Duration;

use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
};

use super::{DeliveryReport, ProducerError, PublishMessage, SyncProducer};

/// Default librdkafka `message.timeout.ms`.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Kafka producer that blocks until librdkafka reports delivery.
///
/// Wrap it in a [`ChannelProducer`](super::ChannelProducer) to use it with an
/// async hook.
pub struct RdKafkaProducer {
    producer: FutureProducer,
}

impl RdKafkaProducer {
    /// Connect to `brokers` (a comma-separated `host:port` list).
    pub fn new(brokers: &str) -> Result<Self, ProducerError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("acks", "all")
            .set(
                "message.timeout.ms",
                DEFAULT_MESSAGE_TIMEOUT.as_millis().to_string(),
            )
            .create()
            .map_err(|err| ProducerError::Broker(err.to_string()))?;
        Ok(Self { producer })
    }

    /// Wrap an already configured client.
    pub fn from_producer(producer: FutureProducer) -> Self {
        Self { producer }
    }
}

impl SyncProducer for RdKafkaProducer {
    fn send_message(&self, message: &PublishMessage) -> Result<DeliveryReport, ProducerError> {
        let record = FutureRecord::to(&message.topic)
            .key(message.key)
            .payload(&message.value);
        let delivery = self
            .producer
            .send_result(record)
            .map_err(|(err, _)| ProducerError::Broker(err.to_string()))?;
        match futures::executor::block_on(delivery) {
            Ok(Ok(delivery)) => Ok(DeliveryReport {
                partition: delivery.partition,
                offset: delivery.offset,
            }),
            Ok(Err((err, _))) => Err(ProducerError::Broker(err.to_string())),
            Err(_) => Err(ProducerError::Closed),
        }
    }
}
