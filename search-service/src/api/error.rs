// HTTP error mapping
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use search_service_repository::SearchServiceError;

/// Errors returned by the HTTP handlers, each rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Bad caller input. 400.
    Validation(String),
    /// Store or schema failure. 500.
    Internal(String),
    /// The request deadline passed before the store answered. 504.
    Timeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(msg) | ApiError::Internal(msg) => msg.clone(),
            ApiError::Timeout => "request deadline exceeded".to_string(),
        }
    }
}

impl From<SearchServiceError> for ApiError {
    fn from(err: SearchServiceError) -> Self {
        match err {
            SearchServiceError::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            error!(status = %status, error = %message, "Request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
