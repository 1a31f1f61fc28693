//! Consumer module for the search service ingest.
//!
//! Provides Kafka consumer functionality for receiving domain events.

mod kafka_consumer;
mod messages;

pub use kafka_consumer::KafkaConsumer;
pub use messages::{CommitPolicy, InboundMessage, StreamMessage};
