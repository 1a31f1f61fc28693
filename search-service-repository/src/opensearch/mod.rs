//! OpenSearch/Elasticsearch implementation of the document store.
//!
//! This module provides a concrete implementation of `DocumentStore`
//! using the OpenSearch Rust crate.

mod provider;

pub use provider::{parse_search_response, OpenSearchStore, StoreCredentials};
