//! Document store error types.
//!
//! This module defines the error type returned by every `DocumentStore`
//! implementation, covering transport failures and non-success responses.

use thiserror::Error;

/// Errors from document store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Failed to establish connection to the store.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A search request could not be executed.
    #[error("Search error: {0}")]
    SearchError(String),

    /// A document write could not be executed.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Failed to check for or create a collection.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// The store answered with a non-success status.
    #[error("Store returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Failed to parse a response from the store.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The requested collection does not exist.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
}

impl StoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a search error.
    pub fn search(msg: impl Into<String>) -> Self {
        Self::SearchError(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create an unexpected status error.
    pub fn unexpected_status(status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a collection not found error.
    pub fn collection_not_found(collection: &str) -> Self {
        Self::CollectionNotFound(collection.to_string())
    }
}
