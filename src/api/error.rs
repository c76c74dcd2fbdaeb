//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::lifecycle::LifecycleError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Record is already in a terminal state")]
    AlreadyTerminal,
    #[error("Transition is not allowed from the current state")]
    InvalidTransition,
    #[error("Persistence timed out")]
    PersistenceTimeout,
    #[error("File storage failed: {0}")]
    StorageFailure(String),
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "VALIDATION", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::AlreadyTerminal => (
                StatusCode::CONFLICT,
                "ALREADY_TERMINAL",
                "Record is already in a terminal state".to_string(),
            ),
            ApiError::InvalidTransition => (
                StatusCode::CONFLICT,
                "INVALID_TRANSITION",
                "Transition is not allowed from the current state".to_string(),
            ),
            ApiError::PersistenceTimeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "PERSISTENCE_TIMEOUT",
                "Persistence did not respond in time; retry with backoff".to_string(),
            ),
            ApiError::StorageFailure(detail) => (
                StatusCode::BAD_GATEWAY,
                "STORAGE_FAILURE",
                detail.clone(),
            ),
            ApiError::NotImplemented(what) => (
                StatusCode::NOT_IMPLEMENTED,
                "NOT_IMPLEMENTED",
                format!("{what} is not available yet"),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        // Timeouts are caller-retryable; say when
        if matches!(self, ApiError::PersistenceTimeout) {
            if let Ok(val) = axum::http::HeaderValue::from_str("1") {
                response.headers_mut().insert("Retry-After", val);
            }
        }
        response
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Validation(v) => ApiError::BadRequest(v.to_string()),
            LifecycleError::NotFound => ApiError::NotFound("Record not found".into()),
            LifecycleError::AlreadyTerminal => ApiError::AlreadyTerminal,
            LifecycleError::InvalidTransition => ApiError::InvalidTransition,
            LifecycleError::PersistenceTimeout => ApiError::PersistenceTimeout,
            LifecycleError::Storage(e) => ApiError::StorageFailure(e.to_string()),
            LifecycleError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id} not found"))
            }
            DatabaseError::Timeout => ApiError::PersistenceTimeout,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use crate::validation::ValidationError;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn validation_returns_400() {
        let err: ApiError = LifecycleError::Validation(ValidationError::PastDate).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn already_terminal_returns_409() {
        let response = ApiError::AlreadyTerminal.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "ALREADY_TERMINAL");
    }

    #[tokio::test]
    async fn invalid_transition_returns_409() {
        let response = ApiError::InvalidTransition.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn timeout_returns_503_with_retry_after() {
        let response = ApiError::PersistenceTimeout.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "1");
    }

    #[tokio::test]
    async fn not_implemented_returns_501() {
        let response = ApiError::NotImplemented("Online payment").into_response();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_IMPLEMENTED");
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let err: ApiError = LifecycleError::NotFound.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
