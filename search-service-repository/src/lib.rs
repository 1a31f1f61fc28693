//! # Search Service Repository
//!
//! Store access and the search/index orchestrator. It includes the
//! `DocumentStore` gateway trait with OpenSearch and in-memory
//! implementations, the collection schemas, the query builder, the result
//! mapper, and `SearchService`, which combines them.

pub mod config;
pub mod document;
pub mod errors;
pub mod interfaces;
pub mod mapper;
pub mod memory;
pub mod opensearch;
pub mod query;
pub mod schema;
pub mod service;
pub mod validation;

pub use config::CollectionNames;
pub use document::IndexDocument;
pub use errors::{SearchServiceError, StoreError, StoreOperation};
pub use interfaces::{DocumentStore, RawHit, SearchHits};
pub use mapper::FromDocument;
pub use memory::InMemoryStore;
pub use opensearch::{OpenSearchStore, StoreCredentials};
pub use service::SearchService;
