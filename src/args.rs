//! CLI argument definitions for the traffic generator.

use crate::config::GeneratorConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Synthetic ad-traffic generator publishing linked impression/click streams
/// to Kafka.
#[derive(Parser, Clone, Debug)]
#[command(name = "omnistream-traffic")]
#[command(about = "Blast causally-linked ad impressions and clicks at a Kafka topic pair")]
pub struct TrafficArgs {
    /// Kafka brokers (comma-separated, e.g., "localhost:9092")
    #[arg(long, env = "KAFKA_BROKERS", default_value = "localhost:9092")]
    pub kafka_brokers: String,

    /// Destination topic for impressions
    #[arg(long, default_value = "ad_impressions")]
    pub impressions_topic: String,

    /// Destination topic for clicks
    #[arg(long, default_value = "ad_clicks")]
    pub clicks_topic: String,

    /// Path to the seeder-produced JSON array of user ids
    #[arg(long, env = "USER_IDS_FILE", default_value = "user_ids.json")]
    pub user_ids_file: PathBuf,

    /// Number of parallel workers blasting data
    #[arg(long, default_value = "4")]
    pub workers: usize,

    /// Click-through probability per impression
    #[arg(long, default_value = "0.05")]
    pub click_probability: f64,

    /// Lower bound of the uniform bid price draw
    #[arg(long, default_value = "0.01")]
    pub bid_price_min: f64,

    /// Upper bound of the uniform bid price draw
    #[arg(long, default_value = "1.00")]
    pub bid_price_max: f64,

    /// Lower bound of the click cost multiplier
    #[arg(long, default_value = "1.2")]
    pub cost_multiplier_min: f64,

    /// Upper bound of the click cost multiplier
    #[arg(long, default_value = "5.0")]
    pub cost_multiplier_max: f64,

    /// Log progress and flush the producer every this many cycles
    #[arg(long, default_value = "5000")]
    pub flush_interval_cycles: u64,

    /// Request a logged delivery acknowledgment for one in N publishes
    /// (0 disables sampling)
    #[arg(long, default_value = "1000")]
    pub ack_sample_rate: u64,

    /// Producer buffer capacity in messages
    #[arg(long, default_value = "100000")]
    pub buffer_max_messages: u64,

    /// Producer buffer linger in milliseconds
    #[arg(long, default_value = "500")]
    pub buffer_max_ms: u64,

    /// Bound on periodic and shutdown-time flushes, in seconds
    #[arg(long, default_value = "30")]
    pub flush_timeout_secs: u64,

    /// Stop each worker after this many cycles (default: run until ctrl-c)
    #[arg(long)]
    pub max_cycles: Option<u64>,
}

impl TrafficArgs {
    pub fn into_config(self) -> GeneratorConfig {
        GeneratorConfig {
            brokers: self.kafka_brokers,
            impressions_topic: self.impressions_topic,
            clicks_topic: self.clicks_topic,
            user_ids_file: self.user_ids_file,
            workers: self.workers,
            click_probability: self.click_probability,
            bid_price_min: self.bid_price_min,
            bid_price_max: self.bid_price_max,
            cost_multiplier_min: self.cost_multiplier_min,
            cost_multiplier_max: self.cost_multiplier_max,
            flush_interval_cycles: self.flush_interval_cycles,
            ack_sample_rate: self.ack_sample_rate,
            buffer_max_messages: self.buffer_max_messages,
            buffer_max_ms: self.buffer_max_ms,
            flush_timeout: Duration::from_secs(self.flush_timeout_secs),
            max_cycles: self.max_cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config_defaults() {
        let args = TrafficArgs::parse_from(["omnistream-traffic"]);
        let config = args.into_config();
        let defaults = GeneratorConfig::default();

        assert_eq!(config.brokers, defaults.brokers);
        assert_eq!(config.impressions_topic, defaults.impressions_topic);
        assert_eq!(config.clicks_topic, defaults.clicks_topic);
        assert_eq!(config.workers, defaults.workers);
        assert_eq!(config.click_probability, defaults.click_probability);
        assert_eq!(config.flush_interval_cycles, defaults.flush_interval_cycles);
        assert_eq!(config.ack_sample_rate, defaults.ack_sample_rate);
        assert_eq!(config.buffer_max_messages, defaults.buffer_max_messages);
        assert_eq!(config.flush_timeout, defaults.flush_timeout);
        assert_eq!(config.max_cycles, None);
    }

    #[test]
    fn test_overrides_flow_into_config() {
        let args = TrafficArgs::parse_from([
            "omnistream-traffic",
            "--workers",
            "2",
            "--click-probability",
            "1.0",
            "--max-cycles",
            "100",
        ]);
        let config = args.into_config();

        assert_eq!(config.workers, 2);
        assert_eq!(config.click_probability, 1.0);
        assert_eq!(config.max_cycles, Some(100));
    }
}
