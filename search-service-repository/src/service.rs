//! Search/index orchestrator.
//!
//! `SearchService` is the façade application code talks to. It clamps
//! pagination, builds queries, calls the `DocumentStore`, and maps raw hits
//! into typed records. Store failures are returned wrapped with the collection
//! and operation that failed; nothing is retried here.
//!
//! Collection schemas are ensured once, when the service is constructed. A
//! service that could not ensure its schemas is never handed out.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use search_service_shared::{
    EntityKind, OperatorFilters, OperatorRecord, Pagination, SearchPage, SearchResults,
    SessionFilters, SessionRecord, TicketFilters, TicketRecord, DEFAULT_LIMIT,
};

use crate::config::CollectionNames;
use crate::document::IndexDocument;
use crate::errors::{SearchServiceError, StoreOperation};
use crate::interfaces::DocumentStore;
use crate::mapper::FromDocument;
use crate::query::{multi_match_query, FilterSet};
use crate::schema::ensure_collections;
use crate::validation::validate_search_request;

/// The main service for searching and indexing tickets, sessions, and operators.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use search_service_repository::{CollectionNames, InMemoryStore, SearchService};
/// use search_service_shared::TicketFilters;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(InMemoryStore::new());
/// let service = SearchService::new(store, CollectionNames::default()).await?;
///
/// let filters = TicketFilters {
///     status: "open".to_string(),
///     ..Default::default()
/// };
/// let page = service.search_tickets(&filters).await?;
/// println!("{} of {} tickets", page.len(), page.total);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn DocumentStore>,
    collections: CollectionNames,
}

impl SearchService {
    /// Create the service and ensure every collection schema exists.
    ///
    /// Returns `SearchServiceError::Schema` if any collection could not be
    /// ensured. Callers must treat that as fatal.
    pub async fn new(
        store: Arc<dyn DocumentStore>,
        collections: CollectionNames,
    ) -> Result<Self, SearchServiceError> {
        ensure_collections(store.as_ref(), &collections).await?;
        Ok(Self { store, collections })
    }

    /// The collection names this service was built with.
    pub fn collections(&self) -> &CollectionNames {
        &self.collections
    }

    /// Search tickets by exact-match filters.
    #[instrument(skip(self))]
    pub async fn search_tickets(
        &self,
        filters: &TicketFilters,
    ) -> Result<SearchPage<TicketRecord>, SearchServiceError> {
        self.search_collection(EntityKind::Ticket, filters).await
    }

    /// Search sessions by exact-match filters.
    #[instrument(skip(self))]
    pub async fn search_sessions(
        &self,
        filters: &SessionFilters,
    ) -> Result<SearchPage<SessionRecord>, SearchServiceError> {
        self.search_collection(EntityKind::Session, filters).await
    }

    /// Search operators by exact-match filters.
    #[instrument(skip(self))]
    pub async fn search_operators(
        &self,
        filters: &OperatorFilters,
    ) -> Result<SearchPage<OperatorRecord>, SearchServiceError> {
        self.search_collection(EntityKind::Operator, filters).await
    }

    /// Create or overwrite the ticket document keyed by `ticket_id`.
    #[instrument(skip(self, ticket), fields(ticket_id = ticket.ticket_id))]
    pub async fn index_ticket(&self, ticket: &TicketRecord) -> Result<(), SearchServiceError> {
        self.upsert(ticket).await
    }

    /// Create or overwrite the session document keyed by `session_id`.
    #[instrument(skip(self, session), fields(session_id = %session.session_id))]
    pub async fn index_session(&self, session: &SessionRecord) -> Result<(), SearchServiceError> {
        self.upsert(session).await
    }

    /// Create or overwrite the operator document keyed by `user_id`.
    #[instrument(skip(self, operator), fields(user_id = %operator.user_id))]
    pub async fn index_operator(
        &self,
        operator: &OperatorRecord,
    ) -> Result<(), SearchServiceError> {
        self.upsert(operator).await
    }

    /// Free-text search across one or all entity families.
    ///
    /// `type_filter` is empty, `all`, or one of `tickets`, `sessions`,
    /// `operators`. A `limit` of zero means the default page size; negative or
    /// over-cap limits are rejected. A blank query returns empty results
    /// without touching the store.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        q: &str,
        type_filter: &str,
        limit: i64,
    ) -> Result<SearchResults, SearchServiceError> {
        let selected = validate_search_request(type_filter, limit)?;
        let limit = if limit == 0 { DEFAULT_LIMIT } else { limit as usize };

        let q = q.trim();
        if q.is_empty() {
            return Ok(SearchResults::default());
        }

        let wants = |kind: EntityKind| selected.map_or(true, |s| s == kind);
        let mut results = SearchResults::default();

        if wants(EntityKind::Ticket) {
            results.tickets = self.free_text(EntityKind::Ticket, q, limit).await?;
        }
        if wants(EntityKind::Session) {
            results.sessions = self.free_text(EntityKind::Session, q, limit).await?;
        }
        if wants(EntityKind::Operator) {
            results.operators = self.free_text(EntityKind::Operator, q, limit).await?;
        }

        debug!(
            tickets = results.tickets.len(),
            sessions = results.sessions.len(),
            operators = results.operators.len(),
            "Combined search completed"
        );
        Ok(results)
    }

    async fn search_collection<F, T>(
        &self,
        kind: EntityKind,
        filters: &F,
    ) -> Result<SearchPage<T>, SearchServiceError>
    where
        F: FilterSet,
        T: FromDocument,
    {
        let page = Pagination::clamp(filters.limit(), filters.offset());
        let collection = self.collections.for_kind(kind);

        let raw = self
            .store
            .search(collection, &filters.to_query(), page.limit, page.offset)
            .await
            .map_err(|e| SearchServiceError::store(collection, StoreOperation::Search, e))?;

        let hits: Vec<T> = raw
            .hits
            .iter()
            .map(|hit| T::from_document(&hit.source))
            .collect();
        let has_more = page.has_more(hits.len(), raw.total);

        debug!(
            collection = %collection,
            total = raw.total,
            returned = hits.len(),
            has_more,
            "Search completed"
        );
        Ok(SearchPage::new(hits, raw.total, has_more))
    }

    async fn free_text<T: FromDocument>(
        &self,
        kind: EntityKind,
        q: &str,
        limit: usize,
    ) -> Result<Vec<T>, SearchServiceError> {
        let collection = self.collections.for_kind(kind);

        let raw = self
            .store
            .search(collection, &multi_match_query(q), limit, 0)
            .await
            .map_err(|e| SearchServiceError::store(collection, StoreOperation::Search, e))?;

        Ok(raw
            .hits
            .iter()
            .map(|hit| T::from_document(&hit.source))
            .collect())
    }

    async fn upsert<D: IndexDocument>(&self, record: &D) -> Result<(), SearchServiceError> {
        let collection = self.collections.for_kind(D::KIND);
        let id = record.document_id();

        self.store
            .upsert_document(collection, &id, &record.to_document())
            .await
            .map_err(|e| SearchServiceError::store(collection, StoreOperation::Index, e))?;

        info!(collection = %collection, doc_id = %id, "Document indexed");
        Ok(())
    }
}
