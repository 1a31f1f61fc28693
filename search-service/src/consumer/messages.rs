//! Message types for the consumer.
//!
//! Defines what flows between the consumer and the orchestrator.

use std::fmt;
use std::str::FromStr;

/// A raw message read from the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// Message body. Empty when the message carried no payload.
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            payload,
        }
    }
}

/// Messages that flow through the ingest.
#[derive(Debug)]
pub enum StreamMessage {
    /// One message to process. The consumer waits for its acknowledgment.
    Event(InboundMessage),
    /// Result of processing the message at the given position.
    Acknowledgment {
        topic: String,
        partition: i32,
        offset: i64,
        success: bool,
        error: Option<String>,
    },
    /// Stream has ended.
    End,
    /// A read error occurred.
    Error(String),
}

/// When the consumer commits a message's offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPolicy {
    /// Commit as soon as the message is read. A crash before the index call
    /// completes loses the event.
    #[default]
    BeforeProcess,
    /// Commit only after a successful acknowledgment. Re-delivered events are
    /// absorbed by the idempotent upsert.
    AfterProcess,
}

impl CommitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitPolicy::BeforeProcess => "before-process",
            CommitPolicy::AfterProcess => "after-process",
        }
    }

    /// Whether a message's offset is committed as soon as it is read.
    pub fn commits_on_read(&self) -> bool {
        matches!(self, CommitPolicy::BeforeProcess)
    }

    /// Whether a message's offset is committed when its acknowledgment
    /// arrives. Failed messages are never committed here.
    pub fn commits_on_ack(&self, success: bool) -> bool {
        success && matches!(self, CommitPolicy::AfterProcess)
    }
}

impl fmt::Display for CommitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "before-process" | "before_process" | "before" => Ok(Self::BeforeProcess),
            "after-process" | "after_process" | "after" => Ok(Self::AfterProcess),
            other => Err(format!("unknown commit mode '{}'", other)),
        }
    }
}
