//! HTTP mapping of domain errors

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::DomainError;

impl DomainError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::NotFound => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DomainError::External(_) => StatusCode::BAD_GATEWAY,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller
    fn public_message(&self) -> String {
        match self {
            DomainError::NotFound => "Resource not found".to_string(),
            DomainError::Validation(msg)
            | DomainError::Conflict(msg)
            | DomainError::Unauthorized(msg)
            | DomainError::NotConfigured(msg)
            | DomainError::External(msg) => msg.clone(),
            DomainError::Database(_) => "Database error".to_string(),
            DomainError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
