//! In-memory document store.
//!
//! A `DocumentStore` substitute for tests and local runs. It understands the
//! query shapes produced by the query builder: `match_all`, `bool.filter` over
//! `term` clauses, and `multi_match`. Documents are kept ordered by id so
//! pagination is deterministic.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::StoreError;
use crate::interfaces::{DocumentStore, RawHit, SearchHits};
use crate::schema::KEYWORD_SUBFIELD;

#[derive(Debug, Default)]
struct Collection {
    mapping: Value,
    documents: BTreeMap<String, Map<String, Value>>,
}

/// A `DocumentStore` backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `ensure_collection` has created the collection.
    pub async fn collection_exists(&self, collection: &str) -> bool {
        self.collections.read().await.contains_key(collection)
    }

    /// The mapping a collection was created with.
    pub async fn mapping(&self, collection: &str) -> Option<Value> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.mapping.clone())
    }

    /// Fetch a stored document by id.
    pub async fn document(&self, collection: &str, id: &str) -> Option<Map<String, Value>> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|c| c.documents.get(id).cloned())
    }

    /// Number of documents in a collection, zero if it does not exist.
    pub async fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, |c| c.documents.len())
    }

    /// Store an arbitrary document, creating the collection if needed.
    ///
    /// Bypasses the typed index path, so it can seed documents with missing or
    /// mistyped fields.
    pub async fn insert_raw(&self, collection: &str, id: &str, source: Map<String, Value>) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .documents
            .insert(id.to_string(), source);
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn search(
        &self,
        collection: &str,
        query: &Value,
        limit: usize,
        offset: usize,
    ) -> Result<SearchHits, StoreError> {
        let collections = self.collections.read().await;
        let stored = collections
            .get(collection)
            .ok_or_else(|| StoreError::collection_not_found(collection))?;

        let matched: Vec<(&String, &Map<String, Value>)> = stored
            .documents
            .iter()
            .filter(|(_, source)| query_matches(query, source))
            .collect();

        let total = matched.len() as u64;
        let hits = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(id, source)| RawHit {
                id: id.clone(),
                source: source.clone(),
            })
            .collect();

        debug!(collection, total, "In-memory search");
        Ok(SearchHits { total, hits })
    }

    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::collection_not_found(collection))?;

        stored.documents.insert(id.to_string(), fields.clone());
        Ok(())
    }

    async fn ensure_collection(&self, collection: &str, mapping: &Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_insert_with(|| Collection {
                mapping: mapping.clone(),
                documents: BTreeMap::new(),
            });
        Ok(())
    }
}

/// Evaluate a query against one document. Unknown query shapes match nothing.
fn query_matches(query: &Value, source: &Map<String, Value>) -> bool {
    if query.get("match_all").is_some() {
        return true;
    }

    if let Some(filters) = query.pointer("/bool/filter").and_then(Value::as_array) {
        return filters.iter().all(|clause| term_matches(clause, source));
    }

    if let Some(text) = query.pointer("/multi_match/query").and_then(Value::as_str) {
        return text_matches(text, source);
    }

    false
}

fn term_matches(clause: &Value, source: &Map<String, Value>) -> bool {
    let Some(term) = clause.get("term").and_then(Value::as_object) else {
        return false;
    };

    term.iter().all(|(path, expected)| {
        let suffix = format!(".{}", KEYWORD_SUBFIELD);
        let field = path.strip_suffix(&suffix).unwrap_or(path);
        match (source.get(field), expected) {
            (Some(Value::String(actual)), Value::String(expected)) => actual == expected,
            (Some(actual), Value::String(expected)) => actual.to_string() == *expected,
            (Some(actual), expected) => actual == expected,
            (None, _) => false,
        }
    })
}

/// Case-insensitive token match over string fields.
fn text_matches(text: &str, source: &Map<String, Value>) -> bool {
    let tokens: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
    if tokens.is_empty() {
        return false;
    }

    source.values().filter_map(Value::as_str).any(|value| {
        let value = value.to_lowercase();
        tokens.iter().any(|token| value.contains(token.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{match_all_query, multi_match_query};
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .ensure_collection("tickets", &json!({}))
            .await
            .unwrap();
        for (id, status, subject) in [
            ("1", "open", "Card declined"),
            ("2", "closed", "Refund request"),
            ("3", "open", "Login issue"),
        ] {
            store
                .upsert_document(
                    "tickets",
                    id,
                    &doc(json!({ "ticket_id": id.parse::<i64>().unwrap(), "status": status, "subject": subject })),
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_match_all_with_paging() {
        let store = seeded().await;

        let page = store.search("tickets", &match_all_query(), 2, 1).await.unwrap();
        assert_eq!(page.total, 3);
        let ids: Vec<_> = page.hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_term_filters() {
        let store = seeded().await;
        let query = json!({ "bool": { "filter": [ { "term": { "status": "open" } } ] } });

        let page = store.search("tickets", &query, 10, 0).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_term_filter_on_numeric_field_and_keyword_subfield() {
        let store = seeded().await;
        let query = json!({ "bool": { "filter": [
            { "term": { "ticket_id": "2" } },
            { "term": { "subject.keyword": "Refund request" } }
        ] } });

        let page = store.search("tickets", &query, 10, 0).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.hits[0].id, "2");
    }

    #[tokio::test]
    async fn test_multi_match_is_case_insensitive() {
        let store = seeded().await;

        let page = store
            .search("tickets", &multi_match_query("LOGIN"), 10, 0)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.hits[0].id, "3");
    }

    #[tokio::test]
    async fn test_missing_collection() {
        let store = InMemoryStore::new();

        let err = store
            .search("tickets", &match_all_query(), 10, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CollectionNotFound(_)));

        let err = store
            .upsert_document("tickets", "1", &Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CollectionNotFound(_)));
    }

    #[tokio::test]
    async fn test_ensure_collection_is_idempotent() {
        let store = seeded().await;

        store
            .ensure_collection("tickets", &json!({ "other": true }))
            .await
            .unwrap();

        assert_eq!(store.document_count("tickets").await, 3);
        assert_eq!(store.mapping("tickets").await, Some(json!({})));
    }
}
