//! Error types for the search service ingest.

use thiserror::Error;

use search_service_repository::SearchServiceError;

/// Errors that can occur in the ingest loop.
///
/// Events that fail admission are not errors; see
/// [`AdmissionDrop`](crate::normalizer::AdmissionDrop).
#[derive(Error, Debug)]
pub enum IngestError {
    /// Kafka-related error.
    #[error("Kafka error: {0}")]
    KafkaError(String),

    /// Channel communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// The index call for an admitted event failed.
    #[error("Index error: {0}")]
    IndexError(#[from] SearchServiceError),
}

impl IngestError {
    /// Create a Kafka error.
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::KafkaError(msg.into())
    }

    /// Create a channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::ChannelError(msg.into())
    }
}

impl From<rdkafka::error::KafkaError> for IngestError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::KafkaError(err.to_string())
    }
}
