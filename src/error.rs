//! Error types for the traffic generator.

use thiserror::Error;

/// Errors that can occur while generating traffic.
#[derive(Error, Debug)]
pub enum TrafficError {
    /// The user id file produced by the seeder is absent, unreadable,
    /// malformed, or empty. Fatal at worker startup; the affected worker
    /// terminates without producing events.
    #[error("missing user data: {0}")]
    MissingUserData(String),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Event payload encoding error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Delivery channel error.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Errors raised by a delivery channel.
///
/// Steady-state delivery failures are not reported here; they surface only
/// through the sampled acknowledgment callbacks and the delivery counters.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("topic creation error: {0}")]
    TopicCreation(String),
}
