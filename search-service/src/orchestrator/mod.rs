//! Orchestrator module for the search service ingest.
//!
//! Coordinates the consumer and the event normalizer. Messages are handled
//! strictly one at a time: the consumer forwards a message and waits for its
//! acknowledgment before reading the next.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, instrument, warn};

use crate::consumer::{InboundMessage, StreamMessage};
use crate::errors::IngestError;
use crate::normalizer::{EventNormalizer, Outcome};
use crate::shutdown::shutdown_signal;

/// A source of inbound messages.
///
/// Implementations send [`StreamMessage::Event`]s on `sender`, wait for the
/// matching [`StreamMessage::Acknowledgment`] on `ack_receiver`, and stop when
/// `shutdown` fires or the acknowledgment channel closes.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Subscribe to the configured topics.
    fn subscribe(&self) -> Result<(), IngestError>;

    /// Read messages until the stream ends or shutdown is signalled.
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        ack_receiver: mpsc::Receiver<StreamMessage>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError>;
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Size of the message channel buffer.
    pub channel_buffer_size: usize,
    /// Interval between progress log lines.
    pub progress_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 16,
            progress_interval: Duration::from_secs(10),
        }
    }
}

/// Counters accumulated since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub events_processed: u64,
    pub documents_indexed: u64,
    pub events_dropped: u64,
    pub index_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    events_processed: AtomicU64,
    documents_indexed: AtomicU64,
    events_dropped: AtomicU64,
    index_failures: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> IngestStats {
        IngestStats {
            events_processed: self.events_processed.load(Ordering::Relaxed),
            documents_indexed: self.documents_indexed.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            index_failures: self.index_failures.load(Ordering::Relaxed),
        }
    }
}

/// Orchestrator that coordinates the ingest components.
///
/// The orchestrator:
/// - Runs the consumer in the background
/// - Hands each message to the normalizer and acknowledges the result
/// - Handles shutdown signals
/// - Logs progress periodically
pub struct Orchestrator {
    consumer: Arc<dyn Consumer>,
    normalizer: EventNormalizer,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    counters: Arc<Counters>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(consumer: Arc<dyn Consumer>, normalizer: EventNormalizer) -> Self {
        Self::with_config(consumer, normalizer, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        consumer: Arc<dyn Consumer>,
        normalizer: EventNormalizer,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            consumer,
            normalizer,
            config,
            shutdown_tx,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> IngestStats {
        self.counters.snapshot()
    }

    /// Run the orchestrator.
    ///
    /// Blocks until the consumer stream ends or SIGINT/SIGTERM is received.
    pub async fn run(&mut self) -> Result<(), IngestError> {
        self.run_until(shutdown_signal()).await
    }

    /// Run the orchestrator until the stream ends or `shutdown` resolves.
    ///
    /// On shutdown the in-flight message is finished and acknowledged before
    /// the consumer is told to stop.
    #[instrument(skip(self, shutdown))]
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), IngestError>
    where
        F: Future<Output = ()> + Send,
    {
        info!("Starting search service ingest");

        self.consumer.subscribe()?;

        let (event_transmitter, mut event_receiver) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);
        let (ack_transmitter, ack_receiver) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);

        let consumer = Arc::clone(&self.consumer);
        let shutdown_rx = self.shutdown_tx.subscribe();

        let consumer_handle = tokio::spawn(async move {
            if let Err(e) = consumer
                .run(event_transmitter, ack_receiver, shutdown_rx)
                .await
            {
                error!(error = %e, "Consumer error");
            }
        });

        info!("Ready to process events");

        let mut progress_timer = interval(self.config.progress_interval);
        progress_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately.
        progress_timer.tick().await;

        tokio::pin!(shutdown);

        let mut prev = IngestStats::default();
        let mut prev_time = std::time::Instant::now();

        loop {
            tokio::select! {
                msg = event_receiver.recv() => {
                    match msg {
                        Some(StreamMessage::Event(message)) => {
                            let result = self.process_message(&message).await;
                            let ack = StreamMessage::Acknowledgment {
                                topic: message.topic,
                                partition: message.partition,
                                offset: message.offset,
                                success: result.is_ok(),
                                error: result.err().map(|e| e.to_string()),
                            };
                            if ack_transmitter.send(ack).await.is_err() {
                                warn!("Acknowledgment channel closed");
                                break;
                            }
                        }
                        Some(StreamMessage::Error(e)) => {
                            error!(error = %e, "Received error from consumer");
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Consumer stream ended");
                            break;
                        }
                        Some(StreamMessage::Acknowledgment { .. }) => {
                            warn!("Received acknowledgment on event channel (should be on ack channel)");
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Stopping consumer");
                    let _ = self.shutdown_tx.send(());
                    break;
                }
                _ = progress_timer.tick() => {
                    let now = std::time::Instant::now();
                    let elapsed_secs = now.duration_since(prev_time).as_secs_f64();
                    let current = self.stats();

                    let rate = |current: u64, previous: u64| {
                        if elapsed_secs > 0.0 {
                            (current.saturating_sub(previous) as f64) / elapsed_secs
                        } else {
                            0.0
                        }
                    };

                    info!(
                        events_processed = current.events_processed,
                        documents_indexed = current.documents_indexed,
                        events_dropped = current.events_dropped,
                        index_failures = current.index_failures,
                        events_per_sec = format!("{:.2}", rate(current.events_processed, prev.events_processed)),
                        documents_per_sec = format!("{:.2}", rate(current.documents_indexed, prev.documents_indexed)),
                        "Processing progress"
                    );

                    prev = current;
                    prev_time = now;
                }
            }
        }

        // Closing the ack channel releases a consumer still waiting on one.
        drop(ack_transmitter);
        let _ = consumer_handle.await;

        let stats = self.stats();
        info!(
            total_events_processed = stats.events_processed,
            total_documents_indexed = stats.documents_indexed,
            total_events_dropped = stats.events_dropped,
            total_index_failures = stats.index_failures,
            "Orchestrator shutdown complete"
        );
        Ok(())
    }

    /// Process one message. Dropped events count as processed successfully.
    async fn process_message(&self, message: &InboundMessage) -> Result<Outcome, IngestError> {
        self.counters.events_processed.fetch_add(1, Ordering::Relaxed);

        debug!(
            topic = %message.topic,
            partition = message.partition,
            offset = message.offset,
            "Processing message"
        );

        match self.normalizer.handle(&message.topic, &message.payload).await {
            Ok(outcome @ Outcome::Indexed { .. }) => {
                self.counters.documents_indexed.fetch_add(1, Ordering::Relaxed);
                Ok(outcome)
            }
            Ok(outcome @ Outcome::Dropped(_)) => {
                self.counters.events_dropped.fetch_add(1, Ordering::Relaxed);
                Ok(outcome)
            }
            Err(e) => {
                self.counters.index_failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    topic = %message.topic,
                    partition = message.partition,
                    offset = message.offset,
                    error = %e,
                    "Failed to process message. Sending NACK to consumer"
                );
                Err(e)
            }
        }
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
