//! Integration tests for the ingest orchestrator.
//!
//! These tests use the real Orchestrator and normalizer with a mock consumer
//! and the in-memory document store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::{broadcast, mpsc, Notify};
use tokio::time::timeout;

use search_service::consumer::{InboundMessage, StreamMessage};
use search_service::errors::IngestError;
use search_service::normalizer::{EventNormalizer, TopicRouting};
use search_service::orchestrator::{Consumer, IngestStats, Orchestrator};
use search_service_repository::{
    CollectionNames, DocumentStore, InMemoryStore, SearchHits, SearchService, StoreError,
};

/// An acknowledgment as seen by the consumer.
#[derive(Debug, Clone, PartialEq)]
struct Ack {
    offset: i64,
    success: bool,
}

// Mock Consumer that replays a fixed list of messages, one at a time
struct MockConsumer {
    messages: Vec<InboundMessage>,
    acks: Arc<Mutex<Vec<Ack>>>,
    error_on_subscribe: bool,
}

impl MockConsumer {
    fn new(messages: Vec<InboundMessage>) -> Self {
        Self {
            messages,
            acks: Arc::new(Mutex::new(Vec::new())),
            error_on_subscribe: false,
        }
    }

    fn with_subscribe_error() -> Self {
        Self {
            error_on_subscribe: true,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl Consumer for MockConsumer {
    fn subscribe(&self) -> Result<(), IngestError> {
        if self.error_on_subscribe {
            Err(IngestError::kafka("Mock subscribe error"))
        } else {
            Ok(())
        }
    }

    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut ack_receiver: mpsc::Receiver<StreamMessage>,
        _shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        for message in &self.messages {
            sender
                .send(StreamMessage::Event(message.clone()))
                .await
                .map_err(|e| IngestError::channel(e.to_string()))?;

            // Nothing else is sent until this message is acknowledged.
            match ack_receiver.recv().await {
                Some(StreamMessage::Acknowledgment {
                    offset, success, ..
                }) => self.acks.lock().unwrap().push(Ack { offset, success }),
                _ => return Ok(()),
            }
        }

        let _ = sender.send(StreamMessage::End).await;
        Ok(())
    }
}

// Consumer that replays its messages and then stays open until shutdown,
// like a Kafka consumer on a quiet topic
struct LongLivedConsumer {
    inner: MockConsumer,
    idle: Arc<Notify>,
    stopped: Arc<AtomicBool>,
}

#[async_trait]
impl Consumer for LongLivedConsumer {
    fn subscribe(&self) -> Result<(), IngestError> {
        Ok(())
    }

    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut ack_receiver: mpsc::Receiver<StreamMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        for message in &self.inner.messages {
            sender
                .send(StreamMessage::Event(message.clone()))
                .await
                .map_err(|e| IngestError::channel(e.to_string()))?;

            if let Some(StreamMessage::Acknowledgment {
                offset, success, ..
            }) = ack_receiver.recv().await
            {
                self.inner.acks.lock().unwrap().push(Ack { offset, success });
            }
        }

        self.idle.notify_one();
        let _ = shutdown.recv().await;
        self.stopped.store(true, Ordering::SeqCst);
        let _ = sender.send(StreamMessage::End).await;
        Ok(())
    }
}

/// Store that accepts schemas but rejects every write.
struct RejectingStore;

#[async_trait]
impl DocumentStore for RejectingStore {
    async fn search(
        &self,
        _collection: &str,
        _query: &Value,
        _limit: usize,
        _offset: usize,
    ) -> Result<SearchHits, StoreError> {
        Ok(SearchHits::default())
    }

    async fn upsert_document(
        &self,
        _collection: &str,
        _id: &str,
        _fields: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        Err(StoreError::unexpected_status(500, "shard failure"))
    }

    async fn ensure_collection(&self, _collection: &str, _mapping: &Value) -> Result<(), StoreError> {
        Ok(())
    }
}

fn message(topic: &str, offset: i64, payload: Value) -> InboundMessage {
    InboundMessage::new(topic, 0, offset, serde_json::to_vec(&payload).unwrap())
}

async fn normalizer_over(store: Arc<dyn DocumentStore>) -> EventNormalizer {
    let service = SearchService::new(store, CollectionNames::default())
        .await
        .unwrap();
    EventNormalizer::new(service, TopicRouting::default())
}

#[tokio::test]
async fn processes_messages_in_order_and_acknowledges_each() {
    let store = Arc::new(InMemoryStore::new());
    let consumer = MockConsumer::new(vec![
        message(
            "psds.ticket.events",
            10,
            json!({ "event": "ticket.created", "ticket_id": 7, "session_id": "s1" }),
        ),
        message(
            "psds.session.created",
            11,
            json!({ "event": "session.created", "session_id": "s1", "client_id": "c1" }),
        ),
        message(
            "psds.operator.updated",
            12,
            json!({ "event": "operator.updated", "user_id": "u1" }),
        ),
        InboundMessage::new("psds.ticket.events", 0, 13, b"garbage".to_vec()),
        message(
            "psds.session.ended",
            14,
            json!({ "event": "session.ended", "session_id": "s1", "client_id": "c1" }),
        ),
    ]);
    let acks = Arc::clone(&consumer.acks);

    let mut orchestrator =
        Orchestrator::new(Arc::new(consumer), normalizer_over(store.clone()).await);

    timeout(Duration::from_secs(5), orchestrator.run())
        .await
        .expect("orchestrator timed out")
        .unwrap();

    let acks = acks.lock().unwrap().clone();
    let offsets: Vec<i64> = acks.iter().map(|a| a.offset).collect();
    assert_eq!(offsets, vec![10, 11, 12, 13, 14]);
    // Drops are not failures.
    assert!(acks.iter().all(|a| a.success));

    assert_eq!(
        orchestrator.stats(),
        IngestStats {
            events_processed: 5,
            documents_indexed: 3,
            events_dropped: 2,
            index_failures: 0,
        }
    );

    assert_eq!(store.document_count("tickets").await, 1);
    assert_eq!(store.document_count("operators").await, 0);
    let session = store.document("sessions", "s1").await.unwrap();
    assert_eq!(session["status"], "finished");
}

#[tokio::test]
async fn index_failure_is_negatively_acknowledged_and_loop_continues() {
    let consumer = MockConsumer::new(vec![
        message(
            "psds.ticket.events",
            1,
            json!({ "event": "ticket.created", "ticket_id": 1, "session_id": "s1" }),
        ),
        message(
            "psds.operator.updated",
            2,
            json!({ "event": "operator.updated", "user_id": "u1" }),
        ),
    ]);
    let acks = Arc::clone(&consumer.acks);

    let mut orchestrator =
        Orchestrator::new(Arc::new(consumer), normalizer_over(Arc::new(RejectingStore)).await);

    timeout(Duration::from_secs(5), orchestrator.run())
        .await
        .expect("orchestrator timed out")
        .unwrap();

    assert_eq!(
        acks.lock().unwrap().clone(),
        vec![
            Ack {
                offset: 1,
                success: false
            },
            Ack {
                offset: 2,
                success: true
            },
        ]
    );
    let stats = orchestrator.stats();
    assert_eq!(stats.index_failures, 1);
    assert_eq!(stats.events_dropped, 1);
}

#[tokio::test]
async fn subscribe_error_stops_the_orchestrator() {
    let store = Arc::new(InMemoryStore::new());
    let mut orchestrator = Orchestrator::new(
        Arc::new(MockConsumer::with_subscribe_error()),
        normalizer_over(store).await,
    );

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, IngestError::KafkaError(_)));
}

#[tokio::test]
async fn empty_stream_completes() {
    let store = Arc::new(InMemoryStore::new());
    let mut orchestrator = Orchestrator::new(
        Arc::new(MockConsumer::new(Vec::new())),
        normalizer_over(store).await,
    );

    timeout(Duration::from_secs(5), orchestrator.run())
        .await
        .expect("orchestrator timed out")
        .unwrap();
    assert_eq!(orchestrator.stats(), IngestStats::default());
}

#[tokio::test]
async fn shutdown_stops_the_consumer_after_acknowledging_in_flight_messages() {
    let store = Arc::new(InMemoryStore::new());
    let consumer = LongLivedConsumer {
        inner: MockConsumer::new(vec![
            message(
                "psds.ticket.events",
                1,
                json!({ "event": "ticket.created", "ticket_id": 3, "session_id": "s1" }),
            ),
            message(
                "psds.operator.updated",
                2,
                json!({ "event": "operator.updated", "user_id": "u1", "display_name": "Ana" }),
            ),
        ]),
        idle: Arc::new(Notify::new()),
        stopped: Arc::new(AtomicBool::new(false)),
    };
    let acks = Arc::clone(&consumer.inner.acks);
    let idle = Arc::clone(&consumer.idle);
    let stopped = Arc::clone(&consumer.stopped);

    let mut orchestrator =
        Orchestrator::new(Arc::new(consumer), normalizer_over(store.clone()).await);

    // Stands in for SIGTERM arriving once the topic has gone quiet.
    let shutdown = async move { idle.notified().await };

    timeout(Duration::from_secs(5), orchestrator.run_until(shutdown))
        .await
        .expect("orchestrator did not stop on shutdown")
        .unwrap();

    assert!(stopped.load(Ordering::SeqCst));
    assert_eq!(
        acks.lock().unwrap().clone(),
        vec![
            Ack {
                offset: 1,
                success: true
            },
            Ack {
                offset: 2,
                success: true
            },
        ]
    );
    assert_eq!(orchestrator.stats().documents_indexed, 2);
    assert_eq!(store.document_count("operators").await, 1);
}
