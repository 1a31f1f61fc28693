//! # Search Service
//!
//! Search over tickets, sessions, and operators. Consumes domain events from
//! Kafka, indexes them into OpenSearch/Elasticsearch, and serves search over
//! HTTP.
//!
//! ## Architecture
//!
//! The ingest worker follows the Consumer-Normalizer pattern:
//!
//! 1. **Consumer**: Receives events from Kafka, one at a time
//! 2. **Normalizer**: Classifies, decodes, and admits each event
//! 3. **Orchestrator**: Coordinates the ingest flow and acknowledgments
//!
//! The HTTP API is a thin layer over `SearchService`.
//!
//! ## Modules
//!
//! - [`api`]: HTTP routes and handlers
//! - [`config`]: Settings and dependency initialization
//! - [`consumer`]: Kafka consumer for domain events
//! - [`normalizer`]: Event classification, decoding, and admission
//! - [`orchestrator`]: Coordinates the ingest flow
//! - [`errors`]: Error types for the ingest
//! - [`logging`]: Tracing setup
//! - [`shutdown`]: SIGINT and SIGTERM handling

pub mod api;
pub mod config;
pub mod consumer;
pub mod errors;
pub mod logging;
pub mod normalizer;
pub mod orchestrator;
pub mod shutdown;

pub use config::{Dependencies, Settings};
pub use errors::IngestError;

use search_service_repository::SearchServiceError;
use thiserror::Error;

/// Errors that can stop either binary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),

    /// Search service construction or call failed.
    #[error("Search service error: {0}")]
    SearchError(#[from] SearchServiceError),

    /// HTTP server error.
    #[error("Server error: {0}")]
    ServerError(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
