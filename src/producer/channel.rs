//! Asynchronous producer backed by a worker thread.
//!
//! [`ChannelProducer`] turns any [`SyncProducer`] into an [`AsyncProducer`]:
//! hooks enqueue onto a bounded channel and a dedicated thread delivers each
//! message through the wrapped producer. Failed deliveries are counted and
//! reported through rate-limited warnings; they are never retried.

use std::{
    sync::{Arc, atomic::Ordering},
    thread::JoinHandle,
    time::Duration,
};

use crossbeam_channel::{Sender, bounded, unbounded};
use parking_lot::Mutex;

use crate::rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner};

use super::{
    AsyncProducer, PublishMessage, SyncProducer,
    worker::{WorkerCommand, WorkerConfig, WorkerStats, spawn_worker},
};

/// Default bounded channel capacity used by the producer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
/// Default time to wait for flush and shutdown acknowledgements.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration for a [`ChannelProducer`].
#[derive(Clone, Debug)]
pub struct ChannelProducerConfig {
    pub capacity: usize,
    pub flush_timeout: Duration,
    pub warn_interval: Duration,
}

impl Default for ChannelProducerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}

impl ChannelProducerConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// Async producer delivering queued messages on a background thread.
pub struct ChannelProducer {
    tx: Sender<PublishMessage>,
    commands: Option<Sender<WorkerCommand>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<WorkerStats>,
    flush_timeout: Duration,
}

impl ChannelProducer {
    /// Spawn a worker delivering through `producer` with default settings.
    pub fn spawn(producer: Arc<dyn SyncProducer>) -> Self {
        Self::with_config(producer, ChannelProducerConfig::default())
    }

    /// Spawn a worker using an explicit configuration.
    ///
    /// A zero capacity is raised to one so the input queue can hold at least
    /// a single message.
    pub fn with_config(producer: Arc<dyn SyncProducer>, config: ChannelProducerConfig) -> Self {
        let (tx, messages) = bounded(config.capacity.max(1));
        let (command_tx, commands) = unbounded();
        let stats = Arc::new(WorkerStats::default());
        let handle = spawn_worker(WorkerConfig {
            producer,
            messages,
            commands,
            stats: Arc::clone(&stats),
            warner: RateLimitedWarner::new(config.warn_interval),
        });
        Self {
            tx,
            commands: Some(command_tx),
            handle: Mutex::new(Some(handle)),
            stats,
            flush_timeout: config.flush_timeout,
        }
    }

    /// Wait until every message queued before this call has been handed to
    /// the wrapped producer.
    ///
    /// Returns `false` when the producer is closed or the worker does not
    /// acknowledge within the flush timeout.
    pub fn flush(&self) -> bool {
        let Some(commands) = &self.commands else {
            return false;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if commands.send(WorkerCommand::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv_timeout(self.flush_timeout).is_ok()
    }

    /// Deliver pending messages and stop the worker thread.
    ///
    /// Waits at most the flush timeout. A worker still draining after that is
    /// left to finish on its own and is not joined.
    pub fn close(&mut self) {
        let Some(commands) = self.commands.take() else {
            return;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if commands.send(WorkerCommand::Shutdown(ack_tx)).is_ok()
            && ack_rx.recv_timeout(self.flush_timeout).is_err()
        {
            log::warn!(
                "ChannelProducer: worker thread did not shut down within {:?}",
                self.flush_timeout
            );
            return;
        }
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if handle.join().is_err() {
            log::warn!("ChannelProducer: worker thread panicked");
        }
    }

    /// Messages the wrapped producer accepted.
    pub fn delivered(&self) -> u64 {
        self.stats.delivered.load(Ordering::Relaxed)
    }

    /// Messages the wrapped producer rejected.
    pub fn errors(&self) -> u64 {
        self.stats.failed.load(Ordering::Relaxed)
    }
}

impl AsyncProducer for ChannelProducer {
    fn input(&self) -> &Sender<PublishMessage> {
        &self.tx
    }
}

impl Drop for ChannelProducer {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ChannelProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelProducer")
            .field("queued", &self.tx.len())
            .field("flush_timeout", &self.flush_timeout)
            .finish()
    }
}
