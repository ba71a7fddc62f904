//! HTTP error responses.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use socialpulse_shared::{FieldError, ProblemDetails};

use crate::storage::StorageError;

/// A problem-details response for `/api/*` handlers.
#[derive(Debug)]
pub struct ApiProblem(pub ProblemDetails);

pub type ApiResult<T> = Result<T, ApiProblem>;

impl ApiProblem {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self(ProblemDetails::bad_request(detail))
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self(ProblemDetails::not_found(detail))
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self(ProblemDetails::conflict(detail))
    }

    pub fn invalid(entity: &str, errors: Vec<FieldError>) -> Self {
        Self(ProblemDetails::validation(format!("Invalid {entity} data"), errors))
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self(ProblemDetails::internal_error(detail))
    }
}

impl From<StorageError> for ApiProblem {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(detail) => Self(ProblemDetails::conflict(detail)),
            StorageError::Backend(detail) => {
                tracing::error!("Storage error: {}", detail);
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiProblem {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiProblem {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(self.0),
        )
            .into_response()
    }
}

/// Parse a numeric path id, answering 400 with `message` otherwise.
pub fn parse_id(raw: &str, message: &str) -> ApiResult<u64> {
    raw.parse().map_err(|_| ApiProblem::bad_request(message))
}
