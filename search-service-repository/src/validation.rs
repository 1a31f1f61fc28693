//! Input validation for the transport layer.
//!
//! These checks run before any store call. Every failure is a
//! [`SearchServiceError::Validation`].

use uuid::Uuid;

use search_service_shared::{EntityKind, OperatorRecord, SessionRecord, TicketRecord, MAX_LIMIT};

use crate::errors::SearchServiceError;

/// Type filter value that selects every entity family.
pub const TYPE_ALL: &str = "all";

/// Validate a combined search request.
///
/// Returns the selected entity family, or `None` when the type filter is empty
/// or `all`.
pub fn validate_search_request(
    type_filter: &str,
    limit: i64,
) -> Result<Option<EntityKind>, SearchServiceError> {
    if limit < 0 {
        return Err(SearchServiceError::validation("limit must be non-negative"));
    }
    if limit > MAX_LIMIT as i64 {
        return Err(SearchServiceError::validation(format!(
            "limit must not exceed {}",
            MAX_LIMIT
        )));
    }

    let type_filter = type_filter.trim();
    if type_filter.is_empty() || type_filter == TYPE_ALL {
        return Ok(None);
    }

    type_filter
        .parse::<EntityKind>()
        .map(Some)
        .map_err(|e| SearchServiceError::validation(e.to_string()))
}

/// Validate a ticket before indexing. All failures are reported together.
pub fn validate_ticket_input(ticket: &TicketRecord) -> Result<(), SearchServiceError> {
    let mut problems = Vec::new();

    if ticket.ticket_id <= 0 {
        problems.push("ticket_id must be positive".to_string());
    }
    if ticket.session_id.trim().is_empty() {
        problems.push("session_id is required".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(SearchServiceError::validation(problems.join("; ")))
    }
}

/// Validate a session before indexing.
pub fn validate_session_input(session: &SessionRecord) -> Result<(), SearchServiceError> {
    validate_uuid("session_id", &session.session_id)
}

/// Validate an operator before indexing.
pub fn validate_operator_input(operator: &OperatorRecord) -> Result<(), SearchServiceError> {
    validate_uuid("user_id", &operator.user_id)
}

fn validate_uuid(field_name: &str, value: &str) -> Result<(), SearchServiceError> {
    if value.trim().is_empty() {
        return Err(SearchServiceError::validation(format!(
            "{} is required",
            field_name
        )));
    }
    Uuid::parse_str(value).map_err(|e| {
        SearchServiceError::validation(format!("{} must be a valid UUID: {}", field_name, e))
    })?;
    Ok(())
}
