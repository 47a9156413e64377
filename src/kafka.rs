//! Kafka-backed delivery channel.
//!
//! Uses rdkafka's callback producer: every enqueued message gets a delivery
//! report through [`DeliveryTracker`], which counts outcomes and logs the
//! sampled ones. A full local queue is converted into backpressure by polling
//! the producer and retrying the enqueue, so the generator blocks instead of
//! dropping events.

use crate::channel::{DeliveryChannel, DeliverySnapshot, DeliveryStats, EventStream};
use crate::config::GeneratorConfig;
use crate::error::ChannelError;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::KafkaError;
use rdkafka::producer::{BaseProducer, BaseRecord, DeliveryResult, Producer, ProducerContext};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::{ClientConfig, ClientContext, Message};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Partition count used when bootstrapping missing topics.
const DEFAULT_TOPIC_PARTITIONS: i32 = 3;

/// Pause between enqueue retries while the local queue is full.
const QUEUE_FULL_BACKOFF: Duration = Duration::from_millis(100);

// Delivery opaque values: whether this publish asked for a logged ack.
const ACK_NONE: usize = 0;
const ACK_SAMPLED: usize = 1;

/// Producer context receiving delivery reports.
///
/// Failures are counted for every message; log lines are emitted only for
/// sampled publishes so the callback path stays cheap at full throughput.
struct DeliveryTracker {
    stats: Arc<DeliveryStats>,
}

impl ClientContext for DeliveryTracker {}

impl ProducerContext for DeliveryTracker {
    type DeliveryOpaque = usize;

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, ack_requested: Self::DeliveryOpaque) {
        match delivery_result {
            Ok(message) => {
                self.stats.record_delivered();
                if ack_requested == ACK_SAMPLED {
                    debug!(
                        "delivery confirmed: topic={} partition={} offset={}",
                        message.topic(),
                        message.partition(),
                        message.offset()
                    );
                }
            }
            Err((err, message)) => {
                self.stats.record_failed();
                if ack_requested == ACK_SAMPLED {
                    warn!("delivery failed: topic={} error={err}", message.topic());
                } else {
                    debug!("delivery failed: topic={} error={err}", message.topic());
                }
            }
        }
    }
}

/// Delivery channel publishing to a Kafka topic pair.
pub struct KafkaChannel {
    producer: BaseProducer<DeliveryTracker>,
    impressions_topic: String,
    clicks_topic: String,
    stats: Arc<DeliveryStats>,
}

impl KafkaChannel {
    /// Create a producer sized for batched high-throughput publishing.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ChannelError> {
        let stats = Arc::new(DeliveryStats::default());
        let tracker = DeliveryTracker {
            stats: Arc::clone(&stats),
        };

        let producer: BaseProducer<DeliveryTracker> = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", "30000")
            .set(
                "queue.buffering.max.messages",
                config.buffer_max_messages.to_string(),
            )
            .set("queue.buffering.max.ms", config.buffer_max_ms.to_string())
            .create_with_context(tracker)?;

        Ok(Self {
            producer,
            impressions_topic: config.impressions_topic.clone(),
            clicks_topic: config.clicks_topic.clone(),
            stats,
        })
    }

    fn topic(&self, stream: EventStream) -> &str {
        match stream {
            EventStream::Impressions => &self.impressions_topic,
            EventStream::Clicks => &self.clicks_topic,
        }
    }
}

#[async_trait]
impl DeliveryChannel for KafkaChannel {
    async fn publish(
        &self,
        stream: EventStream,
        key: &str,
        payload: &[u8],
        ack_requested: bool,
    ) -> Result<(), ChannelError> {
        let opaque = if ack_requested { ACK_SAMPLED } else { ACK_NONE };
        let mut record = BaseRecord::with_opaque_to(self.topic(stream), opaque)
            .key(key)
            .payload(payload);

        loop {
            match self.producer.send(record) {
                Ok(()) => return Ok(()),
                Err((KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull), unsent)) => {
                    // Local buffer full: pump callbacks and wait for space.
                    self.producer.poll(Duration::ZERO);
                    tokio::time::sleep(QUEUE_FULL_BACKOFF).await;
                    record = unsent;
                }
                Err((err, _)) => return Err(ChannelError::Kafka(err)),
            }
        }
    }

    fn drain_pending(&self) {
        self.producer.poll(Duration::ZERO);
    }

    async fn flush(&self, timeout: Duration) -> Result<(), ChannelError> {
        self.producer.flush(timeout)?;
        Ok(())
    }

    fn delivery_stats(&self) -> DeliverySnapshot {
        self.stats.snapshot()
    }
}

/// Create the impression and click topics if they don't exist.
///
/// Concurrent runs racing on creation are fine: "already exists" is success.
pub async fn create_topics_if_missing(config: &GeneratorConfig) -> Result<(), ChannelError> {
    let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
        .set("bootstrap.servers", &config.brokers)
        .create()?;

    let topics = [
        NewTopic::new(
            &config.impressions_topic,
            DEFAULT_TOPIC_PARTITIONS,
            TopicReplication::Fixed(1),
        ),
        NewTopic::new(
            &config.clicks_topic,
            DEFAULT_TOPIC_PARTITIONS,
            TopicReplication::Fixed(1),
        ),
    ];
    let opts = AdminOptions::new().operation_timeout(Some(Duration::from_secs(10)));

    match admin_client.create_topics(&topics, &opts).await {
        Ok(results) => {
            for result in results {
                match result {
                    Ok(topic_name) => {
                        info!("Topic '{topic_name}' created");
                    }
                    Err((topic_name, err)) => {
                        if err.to_string().contains("already exists") {
                            debug!("Topic '{topic_name}' already exists");
                        } else {
                            return Err(ChannelError::TopicCreation(format!(
                                "failed to create topic {topic_name}: {err}"
                            )));
                        }
                    }
                }
            }
        }
        Err(e) => {
            return Err(ChannelError::TopicCreation(format!(
                "failed to create topics: {e}"
            )));
        }
    }

    Ok(())
}
