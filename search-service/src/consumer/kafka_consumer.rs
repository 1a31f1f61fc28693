//! Kafka consumer implementation for the search service.
//!
//! Reads domain events from the configured topics and forwards them to the
//! orchestrator one at a time.

use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer as _, StreamConsumer},
    message::Message as KafkaMessage,
    Offset, TopicPartitionList,
};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, instrument, warn};

use crate::consumer::messages::{CommitPolicy, InboundMessage, StreamMessage};
use crate::errors::IngestError;
use crate::orchestrator::Consumer;

/// Delay before reading again after a read error.
const READ_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Kafka consumer for domain events.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    topics: Vec<String>,
    commit_policy: CommitPolicy,
}

impl KafkaConsumer {
    /// Create a new Kafka consumer.
    ///
    /// # Arguments
    ///
    /// * `brokers` - Kafka broker addresses (comma-separated)
    /// * `group_id` - Consumer group ID
    /// * `topics` - Topics to subscribe to
    /// * `commit_policy` - When offsets are committed
    pub fn new(
        brokers: &str,
        group_id: &str,
        topics: Vec<String>,
        commit_policy: CommitPolicy,
    ) -> Result<Self, IngestError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| IngestError::kafka(e.to_string()))?;

        info!(
            brokers = %brokers,
            group_id = %group_id,
            commit_policy = %commit_policy,
            "Created Kafka consumer"
        );

        Ok(Self {
            consumer,
            topics,
            commit_policy,
        })
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Commit the position after `offset`.
    fn commit(&self, topic: &str, partition: i32, offset: i64) -> Result<(), IngestError> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(topic, partition, Offset::Offset(offset + 1))
            .map_err(|e| IngestError::kafka(e.to_string()))?;

        self.consumer
            .commit(&tpl, CommitMode::Async)
            .map_err(|e| IngestError::kafka(e.to_string()))?;

        Ok(())
    }

    fn commit_logged(&self, topic: &str, partition: i32, offset: i64) {
        match self.commit(topic, partition, offset) {
            Ok(()) => debug!(topic = %topic, partition, offset, "Committed offset"),
            Err(e) => error!(topic = %topic, partition, offset, error = %e, "Failed to commit offset"),
        }
    }
}

#[async_trait]
impl Consumer for KafkaConsumer {
    fn subscribe(&self) -> Result<(), IngestError> {
        let topics: Vec<&str> = self.topics.iter().map(|s| s.as_str()).collect();
        self.consumer
            .subscribe(&topics)
            .map_err(|e| IngestError::kafka(e.to_string()))?;

        info!(topics = ?self.topics, "Subscribed to Kafka topics");
        Ok(())
    }

    #[instrument(skip(self, sender, ack_receiver, shutdown))]
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut ack_receiver: mpsc::Receiver<StreamMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        use futures::StreamExt;

        let mut message_stream = self.consumer.stream();

        loop {
            let message = tokio::select! {
                _ = shutdown.recv() => {
                    info!("Consumer received shutdown signal");
                    let _ = sender.send(StreamMessage::End).await;
                    break;
                }
                message = message_stream.next() => message,
            };

            let inbound = match message {
                Some(Ok(msg)) => InboundMessage::new(
                    msg.topic(),
                    msg.partition(),
                    msg.offset(),
                    msg.payload().map(<[u8]>::to_vec).unwrap_or_default(),
                ),
                Some(Err(e)) => {
                    error!(error = %e, "Kafka read error");
                    let _ = sender.send(StreamMessage::Error(e.to_string())).await;
                    tokio::time::sleep(READ_ERROR_BACKOFF).await;
                    continue;
                }
                None => {
                    info!("Kafka stream ended");
                    let _ = sender.send(StreamMessage::End).await;
                    break;
                }
            };

            debug!(
                topic = %inbound.topic,
                partition = inbound.partition,
                offset = inbound.offset,
                payload_len = inbound.payload.len(),
                "Received message from Kafka"
            );

            if self.commit_policy.commits_on_read() {
                self.commit_logged(&inbound.topic, inbound.partition, inbound.offset);
            }

            sender
                .send(StreamMessage::Event(inbound))
                .await
                .map_err(|e| IngestError::channel(e.to_string()))?;

            match ack_receiver.recv().await {
                Some(StreamMessage::Acknowledgment {
                    topic,
                    partition,
                    offset,
                    success,
                    error,
                }) => {
                    if !success {
                        error!(
                            topic = %topic,
                            partition,
                            offset,
                            error = error.as_deref().unwrap_or("Unknown error"),
                            "Message processing failed"
                        );
                    }
                    if self.commit_policy.commits_on_ack(success) {
                        self.commit_logged(&topic, partition, offset);
                    }
                }
                Some(other) => {
                    warn!(message = ?other, "Unexpected message on acknowledgment channel");
                }
                None => {
                    info!("Acknowledgment channel closed");
                    break;
                }
            }
        }

        Ok(())
    }
}
