//! OpenSearch store implementation.
//!
//! This module provides the concrete implementation of `DocumentStore`
//! using the OpenSearch Rust crate. The same wire protocol is spoken by
//! Elasticsearch, so either backend can sit behind it.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cert::CertificateValidation,
    http::{
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesExistsParts},
    IndexParts, OpenSearch, SearchParts,
};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::StoreError;
use crate::interfaces::{DocumentStore, RawHit, SearchHits};

/// Basic-auth credentials for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    pub username: String,
    pub password: String,
}

/// OpenSearch store implementation.
///
/// # Example
///
/// ```ignore
/// use search_service_repository::opensearch::OpenSearchStore;
/// use search_service_repository::query::match_all_query;
///
/// let store = OpenSearchStore::new("http://localhost:9200", None, false)?;
/// let hits = store.search("tickets", &match_all_query(), 20, 0).await?;
/// ```
pub struct OpenSearchStore {
    client: OpenSearch,
}

impl OpenSearchStore {
    /// Create a new store client for the given URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The store URL (e.g., "http://localhost:9200")
    /// * `credentials` - Optional basic-auth credentials
    /// * `skip_tls_verify` - Disable certificate validation (development only)
    pub fn new(
        url: &str,
        credentials: Option<StoreCredentials>,
        skip_tls_verify: bool,
    ) -> Result<Self, StoreError> {
        let parsed_url = Url::parse(url).map_err(|e| StoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();

        let authenticated = credentials.is_some();
        if let Some(credentials) = credentials {
            builder = builder.auth(Credentials::Basic(
                credentials.username,
                credentials.password,
            ));
        }
        if skip_tls_verify {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        let transport = builder
            .build()
            .map_err(|e| StoreError::connection(e.to_string()))?;

        info!(
            url = %url,
            authenticated,
            skip_tls_verify,
            "Created OpenSearch store"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    /// Check that the store answers.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(StoreError::connection(format!(
                "Ping failed with status {}",
                status
            )));
        }
        Ok(())
    }
}

/// Turn a non-success response into an `UnexpectedStatus` error.
async fn check_status(response: Response, operation: &str) -> Result<Response, StoreError> {
    let status = response.status_code();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(status = %status, body = %body, "{} request failed", operation);
    Err(StoreError::unexpected_status(status.as_u16(), body))
}

/// Extract the total and hits from a search response body.
///
/// `hits.total` is either `{"value": n, ...}` or a bare number depending on the
/// backend version. Hits without an `_id` are skipped; a missing `_source` is
/// treated as an empty document.
pub fn parse_search_response(body: &Value) -> Result<SearchHits, StoreError> {
    let hits = body
        .get("hits")
        .ok_or_else(|| StoreError::parse("response has no 'hits' object"))?;

    let total = match hits.get("total") {
        Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64),
        Some(total) => total.as_u64(),
        None => None,
    }
    .ok_or_else(|| StoreError::parse("response has no numeric 'hits.total'"))?;

    let hits = hits
        .get("hits")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| {
                    let id = hit.get("_id")?.as_str()?.to_string();
                    let source = hit
                        .get("_source")
                        .and_then(Value::as_object)
                        .cloned()
                        .unwrap_or_default();
                    Some(RawHit { id, source })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(SearchHits { total, hits })
}

#[async_trait]
impl DocumentStore for OpenSearchStore {
    async fn search(
        &self,
        collection: &str,
        query: &Value,
        limit: usize,
        offset: usize,
    ) -> Result<SearchHits, StoreError> {
        let response = self
            .client
            .search(SearchParts::Index(&[collection]))
            .from(offset as i64)
            .size(limit as i64)
            .body(json!({
                "query": query,
                "track_total_hits": true
            }))
            .send()
            .await
            .map_err(|e| StoreError::search(e.to_string()))?;

        let response = check_status(response, "Search").await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        let hits = parse_search_response(&body)?;
        debug!(
            collection = %collection,
            total = hits.total,
            returned = hits.hits.len(),
            "Search completed"
        );
        Ok(hits)
    }

    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .index(IndexParts::IndexId(collection, id))
            .body(fields)
            .send()
            .await
            .map_err(|e| StoreError::index(e.to_string()))?;

        check_status(response, "Index").await?;

        debug!(collection = %collection, doc_id = %id, "Document indexed");
        Ok(())
    }

    async fn ensure_collection(&self, collection: &str, mapping: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[collection]))
            .send()
            .await
            .map_err(|e| StoreError::index_creation(e.to_string()))?;

        let status = response.status_code().as_u16();
        if existence_action(collection, status)? == CollectionAction::Keep {
            debug!(collection = %collection, "Collection already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(collection))
            .body(mapping)
            .send()
            .await
            .map_err(|e| StoreError::index_creation(e.to_string()))?;

        check_status(response, "Create collection").await?;

        info!(collection = %collection, "Created collection");
        Ok(())
    }
}

/// What `ensure_collection` does after the existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectionAction {
    Keep,
    Create,
}

/// Map the status of an index existence check to the next step.
///
/// 200 means the collection exists and is left untouched. 404 means it must
/// be created. Anything else is an error, never a create.
fn existence_action(collection: &str, status: u16) -> Result<CollectionAction, StoreError> {
    match status {
        200 => Ok(CollectionAction::Keep),
        404 => Ok(CollectionAction::Create),
        status => Err(StoreError::unexpected_status(
            status,
            format!("existence check for '{}'", collection),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_total_object() {
        let body = json!({
            "hits": {
                "total": { "value": 35, "relation": "eq" },
                "hits": [
                    { "_id": "1", "_source": { "status": "open" } },
                    { "_id": "2", "_source": { "status": "closed" } }
                ]
            }
        });

        let parsed = parse_search_response(&body).unwrap();
        assert_eq!(parsed.total, 35);
        assert_eq!(parsed.hits.len(), 2);
        assert_eq!(parsed.hits[0].id, "1");
        assert_eq!(parsed.hits[1].source["status"], "closed");
    }

    #[test]
    fn test_parse_numeric_total() {
        let body = json!({ "hits": { "total": 3, "hits": [] } });

        let parsed = parse_search_response(&body).unwrap();
        assert_eq!(parsed.total, 3);
        assert!(parsed.hits.is_empty());
    }

    #[test]
    fn test_parse_hit_without_source() {
        let body = json!({
            "hits": { "total": 1, "hits": [ { "_id": "9" }, { "_source": {} } ] }
        });

        let parsed = parse_search_response(&body).unwrap();
        assert_eq!(parsed.hits.len(), 1);
        assert_eq!(parsed.hits[0].id, "9");
        assert!(parsed.hits[0].source.is_empty());
    }

    #[test]
    fn test_parse_missing_hits() {
        let err = parse_search_response(&json!({ "error": "boom" })).unwrap_err();
        assert!(matches!(err, StoreError::ParseError(_)));

        let err = parse_search_response(&json!({ "hits": { "hits": [] } })).unwrap_err();
        assert!(matches!(err, StoreError::ParseError(_)));
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let err = OpenSearchStore::new("not a url", None, false).err().unwrap();
        assert!(matches!(err, StoreError::ConnectionError(_)));
    }

    #[test]
    fn test_new_with_credentials() {
        let credentials = StoreCredentials {
            username: "elastic".to_string(),
            password: "secret".to_string(),
        };
        assert!(OpenSearchStore::new("https://localhost:9200", Some(credentials), true).is_ok());
    }

    #[test]
    fn test_existence_check_status_decides_create() {
        assert_eq!(
            existence_action("tickets", 200).unwrap(),
            CollectionAction::Keep
        );
        assert_eq!(
            existence_action("tickets", 404).unwrap(),
            CollectionAction::Create
        );

        for status in [401, 403, 500, 503] {
            match existence_action("tickets", status) {
                Err(StoreError::UnexpectedStatus { status: got, body }) => {
                    assert_eq!(got, status);
                    assert!(body.contains("tickets"));
                }
                other => panic!("status {} gave {:?}", status, other),
            }
        }
    }
}
