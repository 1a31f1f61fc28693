// HTTP request handlers
use std::future::Future;
use std::time::Duration;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use search_service_repository::validation::{
    validate_operator_input, validate_session_input, validate_ticket_input,
};
use search_service_repository::SearchServiceError;
use search_service_shared::{
    deserialize_page_number, OperatorFilters, OperatorRecord, SearchPage, SearchResults, SessionFilters, SessionRecord,
    TicketFilters, TicketRecord,
};

use crate::api::error::ApiError;
use crate::api::state::AppState;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "search-service";

/// Query parameters of the combined search.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub q: String,
    #[serde(rename = "type")]
    pub type_filter: String,
    /// 0 (absent or empty) means the default page size.
    #[serde(deserialize_with = "deserialize_page_number")]
    pub limit: i64,
}

/// Run a store call under the request deadline.
///
/// Dropping the future on timeout cancels the in-flight store call.
async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, SearchServiceError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(_) => Err(ApiError::Timeout),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "time": chrono::Utc::now().timestamp(),
    }))
}

/// Readiness endpoint. The server only starts once schemas are ensured.
pub async fn ready_check() -> Json<Value> {
    Json(json!({ "ready": true }))
}

/// Combined free-text search: `GET /search?q=&type=&limit=`
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResults>, ApiError> {
    let Query(params) = params?;
    let limit = params.limit;

    debug!(q = %params.q, type_filter = %params.type_filter, limit, "Combined search request");

    let results = with_deadline(
        state.request_timeout,
        state.service.search(&params.q, &params.type_filter, limit),
    )
    .await?;
    Ok(Json(results))
}

/// `GET /search/tickets`
pub async fn search_tickets(
    State(state): State<AppState>,
    filters: Result<Query<TicketFilters>, QueryRejection>,
) -> Result<Json<SearchPage<TicketRecord>>, ApiError> {
    let Query(filters) = filters?;
    let page = with_deadline(state.request_timeout, state.service.search_tickets(&filters)).await?;
    Ok(Json(page))
}

/// `GET /search/sessions`
pub async fn search_sessions(
    State(state): State<AppState>,
    filters: Result<Query<SessionFilters>, QueryRejection>,
) -> Result<Json<SearchPage<SessionRecord>>, ApiError> {
    let Query(filters) = filters?;
    let page = with_deadline(state.request_timeout, state.service.search_sessions(&filters)).await?;
    Ok(Json(page))
}

/// `GET /search/operators`
pub async fn search_operators(
    State(state): State<AppState>,
    filters: Result<Query<OperatorFilters>, QueryRejection>,
) -> Result<Json<SearchPage<OperatorRecord>>, ApiError> {
    let Query(filters) = filters?;
    let page =
        with_deadline(state.request_timeout, state.service.search_operators(&filters)).await?;
    Ok(Json(page))
}

/// `POST /search/index/ticket`
pub async fn index_ticket(
    State(state): State<AppState>,
    payload: Result<Json<TicketRecord>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(ticket) = payload?;
    validate_ticket_input(&ticket)?;

    with_deadline(state.request_timeout, state.service.index_ticket(&ticket)).await?;
    info!(ticket_id = ticket.ticket_id, "Ticket indexed via API");
    Ok(Json(json!({ "ok": true })))
}

/// `POST /search/index/session`
pub async fn index_session(
    State(state): State<AppState>,
    payload: Result<Json<SessionRecord>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(session) = payload?;
    validate_session_input(&session)?;

    with_deadline(state.request_timeout, state.service.index_session(&session)).await?;
    info!(session_id = %session.session_id, "Session indexed via API");
    Ok(Json(json!({ "ok": true })))
}

/// `POST /search/index/operator`
pub async fn index_operator(
    State(state): State<AppState>,
    payload: Result<Json<OperatorRecord>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(operator) = payload?;
    validate_operator_input(&operator)?;

    with_deadline(state.request_timeout, state.service.index_operator(&operator)).await?;
    info!(user_id = %operator.user_id, "Operator indexed via API");
    Ok(Json(json!({ "ok": true })))
}
