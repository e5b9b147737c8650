//! Worker thread draining a [`ChannelProducer`](super::ChannelProducer) queue.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread,
};

use crossbeam_channel::{Receiver, Sender, select};
use log::warn;

use crate::rate_limited_warner::RateLimitedWarner;

use super::{PublishMessage, SyncProducer};

/// Control commands processed alongside queued messages.
#[derive(Debug)]
pub enum WorkerCommand {
    /// Deliver everything queued so far, then acknowledge.
    Flush(Sender<()>),
    /// Deliver everything queued so far, acknowledge and exit.
    Shutdown(Sender<()>),
}

/// Delivery counters shared with the owning producer.
#[derive(Debug, Default)]
pub struct WorkerStats {
    pub delivered: AtomicU64,
    pub failed: AtomicU64,
}

pub struct WorkerConfig {
    pub producer: Arc<dyn SyncProducer>,
    pub messages: Receiver<PublishMessage>,
    pub commands: Receiver<WorkerCommand>,
    pub stats: Arc<WorkerStats>,
    pub warner: RateLimitedWarner,
}

pub fn spawn_worker(config: WorkerConfig) -> thread::JoinHandle<()> {
    thread::spawn(move || worker_loop(config))
}

fn deliver(config: &WorkerConfig, message: PublishMessage) {
    match config.producer.send_message(&message) {
        Ok(_) => {
            config.stats.delivered.fetch_add(1, Ordering::Relaxed);
        }
        Err(err) => {
            config.stats.failed.fetch_add(1, Ordering::Relaxed);
            config.warner.record_drop();
            config.warner.warn_if_due(|count| {
                warn!(
                    "ChannelProducer failed to deliver to topic {}: {err}; dropped {count} messages",
                    message.topic
                );
            });
        }
    }
}

fn drain_pending(config: &WorkerConfig) {
    while let Ok(message) = config.messages.try_recv() {
        deliver(config, message);
    }
}

fn worker_loop(config: WorkerConfig) {
    loop {
        select! {
            recv(config.messages) -> message => match message {
                Ok(message) => deliver(&config, message),
                Err(_) => break,
            },
            recv(config.commands) -> command => match command {
                Ok(WorkerCommand::Flush(ack)) => {
                    drain_pending(&config);
                    let _ = ack.send(());
                }
                Ok(WorkerCommand::Shutdown(ack)) => {
                    drain_pending(&config);
                    let _ = ack.send(());
                    break;
                }
                Err(_) => {
                    drain_pending(&config);
                    break;
                }
            },
        }
    }
    config.warner.flush(|count| {
        warn!("ChannelProducer dropped {count} messages before shutdown");
    });
}
