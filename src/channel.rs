//! Delivery channel abstraction over the two event streams.
//!
//! A channel buffers publishes for asynchronous, batched delivery. `publish`
//! blocks only when the local buffer is full (backpressure bounds memory
//! instead of dropping data); `drain_pending` pumps completion callbacks
//! without forcing a flush; `flush` waits for every buffered message to reach
//! a delivery outcome. Delivery failures never propagate to the caller —
//! they are counted, and logged when the publish was sampled for
//! acknowledgment.

use crate::error::ChannelError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// The two logical destinations of generated traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStream {
    Impressions,
    Clicks,
}

/// Transport to the impression and click streams.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Enqueue a payload for asynchronous delivery.
    ///
    /// The partition key routes related messages to the same partition; an
    /// impression and its derived click always share one. When the local
    /// buffer is full the call waits for space rather than dropping the
    /// message. `ack_requested` asks for a logged acknowledgment of this
    /// message's delivery outcome.
    async fn publish(
        &self,
        stream: EventStream,
        key: &str,
        payload: &[u8],
        ack_requested: bool,
    ) -> Result<(), ChannelError>;

    /// Let completed delivery callbacks fire without forcing a flush.
    ///
    /// Cheap; intended to be called once per generation cycle so the
    /// callback queue never grows unbounded.
    fn drain_pending(&self);

    /// Wait until all currently buffered messages are delivered or failed.
    async fn flush(&self, timeout: Duration) -> Result<(), ChannelError>;

    /// Snapshot of delivery outcomes observed so far.
    fn delivery_stats(&self) -> DeliverySnapshot;
}

/// Policy deciding which publishes request a delivery acknowledgment.
///
/// Acknowledging every message would dominate throughput at scale, so only
/// one in `interval` publishes asks for one. Failures are still counted for
/// every message regardless of sampling.
#[derive(Debug, Clone, Copy)]
pub struct AckSamplingPolicy {
    interval: u64,
}

impl AckSamplingPolicy {
    /// Request an acknowledgment for one in `interval` publishes.
    pub fn every(interval: u64) -> Self {
        Self { interval }
    }

    /// Never request acknowledgments.
    pub fn disabled() -> Self {
        Self { interval: 0 }
    }

    /// Whether the publish with this sequence number should request an ack.
    pub fn should_request_ack(&self, publish_seq: u64) -> bool {
        self.interval != 0 && publish_seq % self.interval == 0
    }
}

/// Shared delivery outcome counters, updated by the transport's callbacks.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl DeliveryStats {
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DeliverySnapshot {
        DeliverySnapshot {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a channel's delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliverySnapshot {
    pub delivered: u64,
    pub failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_policy_fires_on_interval() {
        let policy = AckSamplingPolicy::every(1000);

        assert!(policy.should_request_ack(0));
        assert!(!policy.should_request_ack(1));
        assert!(!policy.should_request_ack(999));
        assert!(policy.should_request_ack(1000));
        assert!(policy.should_request_ack(2000));
    }

    #[test]
    fn test_sampling_policy_every_publish() {
        let policy = AckSamplingPolicy::every(1);
        for seq in 0..10 {
            assert!(policy.should_request_ack(seq));
        }
    }

    #[test]
    fn test_disabled_policy_never_fires() {
        let policy = AckSamplingPolicy::disabled();
        for seq in 0..10_000 {
            assert!(!policy.should_request_ack(seq));
        }
    }

    #[test]
    fn test_delivery_stats_counters() {
        let stats = DeliveryStats::default();
        stats.record_delivered();
        stats.record_delivered();
        stats.record_failed();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.delivered, 2);
        assert_eq!(snapshot.failed, 1);
    }
}
