//! Search result types for the search service.
//!
//! This module defines the response structures returned from search operations.

use serde::{Deserialize, Serialize};

use crate::types::records::{OperatorRecord, SessionRecord, TicketRecord};

/// One page of typed search hits.
///
/// `has_more` is derived from the effective offset, the number of returned hits,
/// and the total match count reported by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchPage<T> {
    /// The hits on this page, at most the effective limit.
    pub hits: Vec<T>,

    /// Total number of matching documents.
    /// May be greater than the number of returned hits due to pagination.
    pub total: u64,

    /// True when more matches exist beyond this page.
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

impl<T> SearchPage<T> {
    /// Create an empty page.
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            total: 0,
            has_more: false,
        }
    }

    /// Create a new page.
    pub fn new(hits: Vec<T>, total: u64, has_more: bool) -> Self {
        Self {
            hits,
            total,
            has_more,
        }
    }

    /// Returns true if there are no hits on this page.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the number of hits on this page.
    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

impl<T> Default for SearchPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Result of a free-text search across one or more collections.
///
/// Collections excluded by the type filter are returned as empty lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    pub tickets: Vec<TicketRecord>,
    pub sessions: Vec<SessionRecord>,
    pub operators: Vec<OperatorRecord>,
}

impl SearchResults {
    /// Returns true if no collection produced a hit.
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty() && self.sessions.is_empty() && self.operators.is_empty()
    }
}
