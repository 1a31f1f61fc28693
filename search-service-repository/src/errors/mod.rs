//! Error types for the search service repository.
//!
//! [`StoreError`] covers failures talking to the document store.
//! [`SearchServiceError`] is what the search/index operations return to callers.

mod service_error;
mod store_error;

pub use service_error::{SearchServiceError, StoreOperation};
pub use store_error::StoreError;
