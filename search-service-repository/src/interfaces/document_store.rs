//! Document store trait definition.
//!
//! This module defines the three capabilities the search service needs from the
//! external full-text store: search, whole-document upsert, and collection setup.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::StoreError;

/// A single hit as returned by the store, before typed decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawHit {
    /// The document id (the record's natural key).
    pub id: String,
    /// The loosely typed stored fields.
    pub source: Map<String, Value>,
}

/// One page of raw hits plus the total match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub total: u64,
    pub hits: Vec<RawHit>,
}

/// Abstracts the underlying document store (OpenSearch, Elasticsearch, in-memory).
///
/// Implementations are injected into `SearchService` so the search and index
/// operations can be exercised against a substitute without a live store.
///
/// Calls carry no timeout of their own. Callers bound them with their own
/// deadline; dropping the returned future aborts the round trip.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Execute `query` against `collection`, returning at most `limit` hits
    /// starting at `offset`, together with the total match count.
    async fn search(
        &self,
        collection: &str,
        query: &Value,
        limit: usize,
        offset: usize,
    ) -> Result<SearchHits, StoreError>;

    /// Write `fields` as the full document `id` in `collection`.
    ///
    /// An existing document with the same id is replaced entirely.
    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Create `collection` with `mapping` unless it already exists.
    async fn ensure_collection(&self, collection: &str, mapping: &Value)
        -> Result<(), StoreError>;
}
