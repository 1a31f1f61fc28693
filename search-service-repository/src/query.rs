//! Query builder for the search service.
//!
//! Turns typed filter sets into store queries. Exact-match filters go into a
//! `bool.filter` clause so they restrict the result set without affecting
//! relevance scoring. The builder is pure: the same input always yields the
//! same query.

use serde_json::{json, Value};

use search_service_shared::{OperatorFilters, SessionFilters, TicketFilters};

/// An exact-match constraint on one store field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterTerm<'a> {
    /// The store field path (e.g. `status`, `display_name.keyword`).
    pub field: &'static str,
    pub value: &'a str,
}

impl<'a> FilterTerm<'a> {
    pub fn new(field: &'static str, value: &'a str) -> Self {
        Self { field, value }
    }

    /// Blank values mean "no constraint".
    pub fn is_active(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// A typed filter set that can be turned into a store query.
pub trait FilterSet {
    /// Every filterable attribute with its (possibly empty) value.
    fn terms(&self) -> Vec<FilterTerm<'_>>;

    /// Raw requested page size.
    fn limit(&self) -> i64;

    /// Raw requested offset.
    fn offset(&self) -> i64;

    /// Build the store query for this filter set.
    fn to_query(&self) -> Value {
        build_filter_query(&self.terms())
    }
}

/// Build a conjunction of exact-match term clauses over the non-empty terms.
///
/// Returns a match-everything query when no term carries a value.
pub fn build_filter_query(terms: &[FilterTerm<'_>]) -> Value {
    let clauses: Vec<Value> = terms
        .iter()
        .filter(|term| term.is_active())
        .map(|term| json!({ "term": { term.field: term.value } }))
        .collect();

    if clauses.is_empty() {
        return match_all_query();
    }

    json!({
        "bool": {
            "filter": clauses
        }
    })
}

/// A query matching every document.
pub fn match_all_query() -> Value {
    json!({ "match_all": {} })
}

/// Free-text query matching `text` across all fields, best-fields semantics.
pub fn multi_match_query(text: &str) -> Value {
    json!({
        "multi_match": {
            "query": text,
            "fields": ["*"],
            "type": "best_fields"
        }
    })
}

impl FilterSet for TicketFilters {
    fn terms(&self) -> Vec<FilterTerm<'_>> {
        vec![
            FilterTerm::new("status", &self.status),
            FilterTerm::new("session_id", &self.session_id),
            FilterTerm::new("client_id", &self.client_id),
            FilterTerm::new("operator_id", &self.operator_id),
        ]
    }

    fn limit(&self) -> i64 {
        self.limit
    }

    fn offset(&self) -> i64 {
        self.offset
    }
}

impl FilterSet for SessionFilters {
    fn terms(&self) -> Vec<FilterTerm<'_>> {
        vec![
            FilterTerm::new("status", &self.status),
            FilterTerm::new("client_id", &self.client_id),
            FilterTerm::new("pin", &self.pin),
        ]
    }

    fn limit(&self) -> i64 {
        self.limit
    }

    fn offset(&self) -> i64 {
        self.offset
    }
}

impl FilterSet for OperatorFilters {
    fn terms(&self) -> Vec<FilterTerm<'_>> {
        vec![
            FilterTerm::new("region", &self.region),
            FilterTerm::new("role", &self.role),
            // display_name is analyzed text; exact matches go to the keyword subfield
            FilterTerm::new("display_name.keyword", &self.display_name),
        ]
    }

    fn limit(&self) -> i64 {
        self.limit
    }

    fn offset(&self) -> i64 {
        self.offset
    }
}
