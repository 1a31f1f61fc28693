//! Errors surfaced by the search and index operations.

use std::fmt;
use thiserror::Error;

use super::StoreError;

/// The kind of store call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Search,
    Index,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOperation::Search => "search",
            StoreOperation::Index => "index",
        };
        f.write_str(name)
    }
}

/// Errors returned by `SearchService`.
///
/// Callers can tell bad input (`Validation`) apart from store failures (`Store`).
/// `Schema` is only produced while constructing the service.
#[derive(Debug, Clone, Error)]
pub enum SearchServiceError {
    /// Caller input was malformed or out of range. Never reaches the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A store call failed. No retry has been attempted.
    #[error("{operation} on collection '{collection}' failed: {source}")]
    Store {
        collection: String,
        operation: StoreOperation,
        #[source]
        source: StoreError,
    },

    /// A collection schema could not be ensured at startup.
    #[error("Failed to ensure schema for collection '{collection}': {source}")]
    Schema {
        collection: String,
        #[source]
        source: StoreError,
    },
}

impl SearchServiceError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap a store failure with the collection and operation that produced it.
    pub fn store(collection: &str, operation: StoreOperation, source: StoreError) -> Self {
        Self::Store {
            collection: collection.to_string(),
            operation,
            source,
        }
    }

    /// Wrap a schema failure for the given collection.
    pub fn schema(collection: &str, source: StoreError) -> Self {
        Self::Schema {
            collection: collection.to_string(),
            source,
        }
    }

    /// Returns true for caller input errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_message_names_collection_and_operation() {
        let err = SearchServiceError::store(
            "tickets",
            StoreOperation::Search,
            StoreError::connection("connection refused"),
        );

        let message = err.to_string();
        assert!(message.contains("search"));
        assert!(message.contains("tickets"));
        assert!(message.contains("connection refused"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_error() {
        let err = SearchServiceError::validation("limit must not exceed 100");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Validation error: limit must not exceed 100");
    }
}
