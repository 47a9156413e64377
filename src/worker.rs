//! A single traffic worker.
//!
//! Each worker binds one synthesizer to one delivery channel and runs the
//! generation loop to cancellation. The lifecycle is
//! `Initializing → Loading → Running → Draining → Stopped`; shutdown is
//! cooperative and checked once per cycle boundary, so an impression/click
//! pair is never split across it.

use crate::channel::{AckSamplingPolicy, DeliveryChannel, DeliverySnapshot, EventStream};
use crate::config::GeneratorConfig;
use crate::error::TrafficError;
use crate::synth::{EventSynthesizer, SynthParams};
use crate::users::UserPool;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Initializing,
    Loading,
    Running,
    Draining,
    Stopped,
}

/// Counters reported by a worker once it reaches `Stopped`.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub worker_id: usize,
    /// Completed generation cycles.
    pub cycles: u64,
    pub impressions: u64,
    pub clicks: u64,
    pub delivery: DeliverySnapshot,
}

/// One generation loop bound to a private synthesizer and channel.
pub struct Worker<C> {
    id: usize,
    config: GeneratorConfig,
    channel: C,
    shutdown: broadcast::Receiver<()>,
    state: WorkerState,
}

impl<C: DeliveryChannel> Worker<C> {
    pub fn new(
        id: usize,
        config: GeneratorConfig,
        channel: C,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            id,
            config,
            channel,
            shutdown,
            state: WorkerState::Initializing,
        }
    }

    fn transition(&mut self, next: WorkerState) {
        debug!("[worker {}] {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }

    /// A signal on the shutdown channel (or its closure) requests draining.
    fn shutdown_requested(&mut self) -> bool {
        !matches!(
            self.shutdown.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        )
    }

    /// Run to cancellation (or the configured cycle bound).
    ///
    /// Returns `Err` only for startup failures; once running, delivery
    /// problems are observed through the channel's counters and never halt
    /// generation.
    pub async fn run(mut self) -> Result<WorkerReport, TrafficError> {
        self.transition(WorkerState::Loading);
        let pool = match UserPool::load(&self.config.user_ids_file) {
            Ok(pool) => pool,
            Err(e) => {
                error!("[worker {}] failed to load user pool: {e}", self.id);
                self.transition(WorkerState::Stopped);
                return Err(e);
            }
        };
        info!("[worker {}] loaded {} user ids", self.id, pool.len());

        let mut synth = EventSynthesizer::new(pool, SynthParams::from(&self.config));
        let ack_policy = AckSamplingPolicy::every(self.config.ack_sample_rate);

        self.transition(WorkerState::Running);
        let mut cycles = 0u64;
        let mut impressions = 0u64;
        let mut clicks = 0u64;
        let mut publishes = 0u64;

        loop {
            if self.shutdown_requested() {
                break;
            }
            if let Some(max) = self.config.max_cycles {
                if cycles >= max {
                    break;
                }
            }

            let cycle = synth.next_cycle();
            // The impression id keys both messages so they land in the same
            // partition, and the impression is enqueued strictly first.
            let key = cycle.impression.impression_id.to_string();

            let payload = serde_json::to_vec(&cycle.impression)?;
            if let Err(e) = self
                .channel
                .publish(
                    EventStream::Impressions,
                    &key,
                    &payload,
                    ack_policy.should_request_ack(publishes),
                )
                .await
            {
                warn!("[worker {}] impression publish failed: {e}", self.id);
            }
            publishes += 1;
            impressions += 1;

            if let Some(click) = &cycle.click {
                let payload = serde_json::to_vec(click)?;
                if let Err(e) = self
                    .channel
                    .publish(
                        EventStream::Clicks,
                        &key,
                        &payload,
                        ack_policy.should_request_ack(publishes),
                    )
                    .await
                {
                    warn!("[worker {}] click publish failed: {e}", self.id);
                }
                publishes += 1;
                clicks += 1;
            }

            self.channel.drain_pending();
            cycles += 1;

            if cycles % self.config.flush_interval_cycles == 0 {
                info!(
                    "[worker {}] {} cycles ({} impressions, {} clicks)",
                    self.id, cycles, impressions, clicks
                );
                if let Err(e) = self.channel.flush(self.config.flush_timeout).await {
                    warn!("[worker {}] periodic flush failed: {e}", self.id);
                }
            }

            // Keep the loop cooperative so sibling workers and the signal
            // listener get scheduled between cycles.
            tokio::task::yield_now().await;
        }

        self.transition(WorkerState::Draining);
        if let Err(e) = self.channel.flush(self.config.flush_timeout).await {
            warn!("[worker {}] drain flush failed: {e}", self.id);
        }
        self.transition(WorkerState::Stopped);

        let delivery = self.channel.delivery_stats();
        info!(
            "[worker {}] stopped after {} cycles ({} impressions, {} clicks, {} delivered, {} failed)",
            self.id, cycles, impressions, clicks, delivery.delivered, delivery.failed
        );

        Ok(WorkerReport {
            worker_id: self.id,
            cycles,
            impressions,
            clicks,
            delivery,
        })
    }
}
