//! This module defines the core data structures used across the search service.
//! It re-exports the record, filter, and result types.

pub mod entity_kind;
pub mod filters;
pub mod pagination;
pub mod records;
pub mod search_result;

pub use entity_kind::EntityKind;
pub use filters::{OperatorFilters, SessionFilters, TicketFilters};
pub use pagination::Pagination;
pub use records::{OperatorRecord, SessionRecord, TicketRecord};
pub use search_result::{SearchPage, SearchResults};
