//! Worker pool coordination.
//!
//! Launches N workers as independent tokio tasks, each with wholly private
//! state (own pool load, own synthesizer, own channel), and waits for every
//! one to stop before returning. Workers share nothing mutable; the only
//! cross-task communication is the shutdown broadcast.

use crate::channel::DeliveryChannel;
use crate::config::GeneratorConfig;
use crate::error::ChannelError;
use crate::worker::{Worker, WorkerReport};
use tokio::sync::broadcast;
use tracing::{error, info};

/// Aggregated outcome of a generation run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Reports from workers that reached `Stopped` cleanly.
    pub reports: Vec<WorkerReport>,
    /// Workers that failed to start or errored out.
    pub failed: usize,
}

impl RunSummary {
    pub fn total_impressions(&self) -> u64 {
        self.reports.iter().map(|r| r.impressions).sum()
    }

    pub fn total_clicks(&self) -> u64 {
        self.reports.iter().map(|r| r.clicks).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Launch `config.workers` workers and await their termination.
///
/// `make_channel` builds one delivery channel per worker; a construction
/// failure counts as a failed worker and does not stop the others. The call
/// returns only after every launched worker has drained and stopped.
pub async fn run_workers<C, F>(
    config: &GeneratorConfig,
    shutdown: &broadcast::Sender<()>,
    mut make_channel: F,
) -> RunSummary
where
    C: DeliveryChannel + 'static,
    F: FnMut(usize) -> Result<C, ChannelError>,
{
    let mut summary = RunSummary::default();
    let mut handles = Vec::with_capacity(config.workers);

    for id in 0..config.workers {
        let channel = match make_channel(id) {
            Ok(channel) => channel,
            Err(e) => {
                error!("[worker {id}] failed to create delivery channel: {e}");
                summary.failed += 1;
                continue;
            }
        };
        let worker = Worker::new(id, config.clone(), channel, shutdown.subscribe());
        handles.push(tokio::spawn(worker.run()));
    }

    for handle in handles {
        match handle.await {
            Ok(Ok(report)) => {
                summary.reports.push(report);
            }
            Ok(Err(e)) => {
                error!("worker failed: {e}");
                summary.failed += 1;
            }
            Err(e) => {
                error!("worker task panicked: {e}");
                summary.failed += 1;
            }
        }
    }

    info!(
        "all workers stopped: {} impressions, {} clicks, {} failed workers",
        summary.total_impressions(),
        summary.total_clicks(),
        summary.failed
    );

    summary
}
