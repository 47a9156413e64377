//! Test support: an in-memory delivery channel.
//!
//! Records every publish with its stream, partition key, payload, and ack
//! flag. Enqueued messages stay pending until `flush`, which resolves each
//! one to a delivery outcome (failure injection included), mirroring the
//! buffered transport the production channel wraps. Handles are cheap clones
//! over shared state so a test can keep a probe while the worker owns the
//! channel.

use crate::channel::{DeliveryChannel, DeliverySnapshot, DeliveryStats, EventStream};
use crate::error::ChannelError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Final delivery outcome of a recorded publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed,
}

/// One captured `publish` call.
#[derive(Debug, Clone)]
pub struct RecordedPublish {
    pub stream: EventStream,
    pub key: String,
    pub payload: Vec<u8>,
    pub ack_requested: bool,
    /// `None` while buffered; set when a flush resolves the message.
    pub outcome: Option<DeliveryOutcome>,
}

#[derive(Default)]
struct MemoryInner {
    records: Mutex<Vec<RecordedPublish>>,
    stats: DeliveryStats,
    fail_deliveries: AtomicBool,
}

/// In-memory [`DeliveryChannel`] for tests.
#[derive(Clone, Default)]
pub struct MemoryChannel {
    inner: Arc<MemoryInner>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent flushes resolve pending messages as failed.
    pub fn set_fail_deliveries(&self, fail: bool) {
        self.inner.fail_deliveries.store(fail, Ordering::Relaxed);
    }

    /// Snapshot of everything published so far.
    pub fn records(&self) -> Vec<RecordedPublish> {
        self.inner.records.lock().unwrap().clone()
    }

    /// Number of messages still awaiting a delivery outcome.
    pub fn outstanding(&self) -> usize {
        self.inner
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.outcome.is_none())
            .count()
    }
}

#[async_trait]
impl DeliveryChannel for MemoryChannel {
    async fn publish(
        &self,
        stream: EventStream,
        key: &str,
        payload: &[u8],
        ack_requested: bool,
    ) -> Result<(), ChannelError> {
        self.inner.records.lock().unwrap().push(RecordedPublish {
            stream,
            key: key.to_string(),
            payload: payload.to_vec(),
            ack_requested,
            outcome: None,
        });
        Ok(())
    }

    fn drain_pending(&self) {
        // Outcomes resolve at flush; nothing to pump in between.
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), ChannelError> {
        let outcome = if self.inner.fail_deliveries.load(Ordering::Relaxed) {
            DeliveryOutcome::Failed
        } else {
            DeliveryOutcome::Delivered
        };

        let mut records = self.inner.records.lock().unwrap();
        for record in records.iter_mut().filter(|r| r.outcome.is_none()) {
            record.outcome = Some(outcome);
            match outcome {
                DeliveryOutcome::Delivered => self.inner.stats.record_delivered(),
                DeliveryOutcome::Failed => self.inner.stats.record_failed(),
            }
        }
        Ok(())
    }

    fn delivery_stats(&self) -> DeliverySnapshot {
        self.inner.stats.snapshot()
    }
}
