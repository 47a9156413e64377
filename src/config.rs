//! Generator configuration.
//!
//! All knobs live in one explicit structure handed to the coordinator at
//! construction, so nothing is read from ambient globals once the process is
//! up.

use crate::error::TrafficError;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a traffic generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Kafka broker addresses, e.g. "localhost:9092".
    pub brokers: String,
    /// Destination topic for impressions.
    pub impressions_topic: String,
    /// Destination topic for clicks.
    pub clicks_topic: String,
    /// Path to the seeder-produced JSON array of user ids.
    pub user_ids_file: PathBuf,
    /// Number of independent workers.
    pub workers: usize,
    /// Probability that a cycle derives a click from its impression.
    pub click_probability: f64,
    pub bid_price_min: f64,
    pub bid_price_max: f64,
    pub cost_multiplier_min: f64,
    pub cost_multiplier_max: f64,
    /// Every this many cycles a worker logs progress and flushes its channel.
    pub flush_interval_cycles: u64,
    /// One in this many publishes requests a logged delivery acknowledgment
    /// (0 disables sampling).
    pub ack_sample_rate: u64,
    /// Transport buffer capacity in messages.
    pub buffer_max_messages: u64,
    /// Transport buffer linger in milliseconds.
    pub buffer_max_ms: u64,
    /// Bound on periodic and shutdown-time flushes.
    pub flush_timeout: Duration,
    /// Stop each worker after this many cycles (None = run to cancellation).
    pub max_cycles: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            impressions_topic: "ad_impressions".to_string(),
            clicks_topic: "ad_clicks".to_string(),
            user_ids_file: PathBuf::from("user_ids.json"),
            workers: 4,
            click_probability: 0.05,
            bid_price_min: 0.01,
            bid_price_max: 1.00,
            cost_multiplier_min: 1.2,
            cost_multiplier_max: 5.0,
            flush_interval_cycles: 5000,
            ack_sample_rate: 1000,
            buffer_max_messages: 100_000,
            buffer_max_ms: 500,
            flush_timeout: Duration::from_secs(30),
            max_cycles: None,
        }
    }
}

impl GeneratorConfig {
    /// Reject configurations the generator cannot run with.
    pub fn validate(&self) -> Result<(), TrafficError> {
        if self.workers == 0 {
            return Err(TrafficError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.click_probability) {
            return Err(TrafficError::InvalidConfig(format!(
                "click probability {} not in [0.0, 1.0]",
                self.click_probability
            )));
        }
        if self.bid_price_min <= 0.0 || self.bid_price_min > self.bid_price_max {
            return Err(TrafficError::InvalidConfig(format!(
                "bid price range [{}, {}] is not a positive, ordered range",
                self.bid_price_min, self.bid_price_max
            )));
        }
        if self.cost_multiplier_min <= 0.0 || self.cost_multiplier_min > self.cost_multiplier_max {
            return Err(TrafficError::InvalidConfig(format!(
                "cost multiplier range [{}, {}] is not a positive, ordered range",
                self.cost_multiplier_min, self.cost_multiplier_max
            )));
        }
        if self.flush_interval_cycles == 0 {
            return Err(TrafficError::InvalidConfig(
                "flush interval must be at least 1 cycle".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_workers() {
        let config = GeneratorConfig {
            workers: 0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrafficError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let config = GeneratorConfig {
            click_probability: 1.5,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrafficError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_bid_range() {
        let config = GeneratorConfig {
            bid_price_min: 2.0,
            bid_price_max: 1.0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrafficError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_zero_flush_interval() {
        let config = GeneratorConfig {
            flush_interval_cycles: 0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrafficError::InvalidConfig(_))
        ));
    }
}
