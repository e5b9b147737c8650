//! In-process producers for tests and local development.

use std::collections::{HashMap, VecDeque};

use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::Mutex;

use super::{AsyncProducer, DeliveryReport, ProducerError, PublishMessage, SyncProducer};

#[derive(Default)]
struct MemoryState {
    messages: Vec<PublishMessage>,
    offsets: HashMap<String, i64>,
    failures: VecDeque<ProducerError>,
    closed: bool,
}

/// Synchronous producer that records every message it accepts.
///
/// Each topic behaves as a single partition (0) with offsets starting at 0.
/// Failures queued with [`fail_next`](MemoryProducer::fail_next) are returned
/// in order before normal delivery resumes.
#[derive(Default)]
pub struct MemoryProducer {
    state: Mutex<MemoryState>,
}

impl MemoryProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `err` to be returned by the next send.
    pub fn fail_next(&self, err: ProducerError) {
        self.state.lock().failures.push_back(err);
    }

    /// Reject every subsequent send with [`ProducerError::Closed`].
    pub fn close(&self) {
        self.state.lock().closed = true;
    }

    /// Return a snapshot of all messages delivered so far.
    pub fn messages(&self) -> Vec<PublishMessage> {
        self.state.lock().messages.clone()
    }

    /// Remove and return all delivered messages.
    pub fn take_messages(&self) -> Vec<PublishMessage> {
        std::mem::take(&mut self.state.lock().messages)
    }

    /// Delivered messages for a single topic.
    pub fn messages_for(&self, topic: &str) -> Vec<PublishMessage> {
        self.state
            .lock()
            .messages
            .iter()
            .filter(|msg| msg.topic == topic)
            .cloned()
            .collect()
    }
}

impl SyncProducer for MemoryProducer {
    fn send_message(&self, message: &PublishMessage) -> Result<DeliveryReport, ProducerError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(ProducerError::Closed);
        }
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        let next = state.offsets.entry(message.topic.clone()).or_insert(0);
        let offset = *next;
        *next += 1;
        state.messages.push(message.clone());
        Ok(DeliveryReport {
            partition: 0,
            offset,
        })
    }
}

/// Asynchronous producer whose input queue is read back by the caller.
///
/// Nothing drains the queue automatically, which makes saturation easy to
/// reproduce.
pub struct MemoryAsyncProducer {
    tx: Sender<PublishMessage>,
    rx: Receiver<PublishMessage>,
}

impl MemoryAsyncProducer {
    /// Create a producer whose input holds at most `capacity` messages.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx }
    }

    /// Number of messages waiting in the input queue.
    pub fn queued(&self) -> usize {
        self.rx.len()
    }

    /// Pop the oldest queued message, if any.
    pub fn try_recv(&self) -> Option<PublishMessage> {
        self.rx.try_recv().ok()
    }

    /// Remove and return every queued message.
    pub fn drain(&self) -> Vec<PublishMessage> {
        self.rx.try_iter().collect()
    }
}

impl AsyncProducer for MemoryAsyncProducer {
    fn input(&self) -> &Sender<PublishMessage> {
        &self.tx
    }
}
