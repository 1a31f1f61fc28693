//! # Search Service Shared
//!
//! This crate defines the data structures shared across the search service:
//! the typed ticket, session, and operator records, the filter sets accepted by
//! each search operation, and the pagination and result types every search returns.

pub mod types;

pub use types::entity_kind::{EntityKind, ParseEntityKindError};
pub use types::filters::{
    deserialize_page_number, OperatorFilters, SessionFilters, TicketFilters,
};
pub use types::pagination::{Pagination, DEFAULT_LIMIT, MAX_LIMIT};
pub use types::records::{OperatorRecord, SessionRecord, TicketRecord};
pub use types::search_result::{SearchPage, SearchResults};
