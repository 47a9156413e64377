//! Command-line entry point for the traffic generator.
//!
//! # Usage
//!
//! ```bash
//! # Run 4 workers against a local broker until ctrl-c
//! omnistream-traffic --kafka-brokers localhost:9092 --user-ids-file user_ids.json
//!
//! # Deterministic smoke run: every impression clicks, bounded cycles
//! omnistream-traffic --workers 1 --click-probability 1.0 --max-cycles 1000
//! ```
//!
//! Exits 0 after a clean drain; non-zero when any worker fails to start
//! (typically a missing or empty user id file).

use anyhow::Context;
use clap::Parser;
use omnistream_traffic::{create_topics_if_missing, run_workers, KafkaChannel, TrafficArgs};
use tokio::sync::broadcast;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omnistream_traffic=info".into()),
        )
        .init();

    let args = TrafficArgs::parse();
    match run_main(args).await {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {e:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main(args: TrafficArgs) -> anyhow::Result<()> {
    let config = args.into_config();
    config.validate()?;

    create_topics_if_missing(&config)
        .await
        .context("failed to bootstrap Kafka topics")?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, draining workers");
            let _ = signal_tx.send(());
        }
    });

    info!(
        "starting {} traffic workers against {} (topics: {}, {})",
        config.workers, config.brokers, config.impressions_topic, config.clicks_topic
    );

    let summary = run_workers(&config, &shutdown_tx, |_| KafkaChannel::new(&config)).await;

    if !summary.is_success() {
        anyhow::bail!(
            "{} of {} workers failed; {} impressions and {} clicks published",
            summary.failed,
            config.workers,
            summary.total_impressions(),
            summary.total_clicks()
        );
    }

    info!(
        "clean shutdown: {} impressions, {} clicks",
        summary.total_impressions(),
        summary.total_clicks()
    );
    Ok(())
}
