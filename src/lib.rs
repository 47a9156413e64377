//! Synthetic ad-traffic generator.
//!
//! Emulates real-world ad-serving traffic: a continuous stream of impression
//! events and causally-derived click events, published to a Kafka topic pair
//! for downstream pipeline testing.
//!
//! # Architecture
//!
//! ```text
//! user_ids.json (seeder output)
//!        │
//!        ▼
//! ┌──────────────┐     per worker      ┌───────────────────┐
//! │   UserPool   │──────────────────▶  │ EventSynthesizer  │
//! └──────────────┘                     │  impression +     │
//!                                      │  p(click)=0.05    │
//!                                      └─────────┬─────────┘
//!                                                │ keyed by impression_id
//!                                                ▼
//!                                      ┌───────────────────┐
//!                                      │  DeliveryChannel  │
//!                                      │  buffered, acks   │
//!                                      └─────────┬─────────┘
//!                                                ▼
//!                                 ad_impressions / ad_clicks topics
//! ```
//!
//! The coordinator launches N workers as isolated tasks; each owns its pool
//! copy, synthesizer, and channel. Within a worker an impression is always
//! published before its derived click and both share a partition key, so a
//! downstream consumer can join them with partition-local ordering. Shutdown
//! is cooperative: on ctrl-c every worker finishes its current cycle, flushes
//! its buffer, and stops.

pub mod args;
pub mod channel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod kafka;
pub mod synth;
pub mod testing;
pub mod users;
pub mod worker;

// Re-exports for convenience
pub use args::TrafficArgs;
pub use channel::{AckSamplingPolicy, DeliveryChannel, DeliverySnapshot, EventStream};
pub use config::GeneratorConfig;
pub use coordinator::{run_workers, RunSummary};
pub use error::{ChannelError, TrafficError};
pub use events::{round_to_cents, AdCycle, Click, Impression};
pub use kafka::{create_topics_if_missing, KafkaChannel};
pub use synth::{EventSynthesizer, SynthParams};
pub use users::UserPool;
pub use worker::{Worker, WorkerReport, WorkerState};
