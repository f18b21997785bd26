//! HTTP error handling and response types.

use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::validation::NON_FIELD_ERRORS;
use crate::models::FieldErrors;
use crate::services::ServiceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Per-field validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            fields: None,
        }
    }

    pub fn with_fields(mut self, fields: FieldErrors) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Missing or unknown token
    Unauthorized(String),
    /// Caller does not own the record
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(FieldErrors),
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(crate::db::repository::RepositoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("UNAUTHORIZED", msg),
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ApiError::new("PERMISSION_DENIED", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(fields) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("VALIDATION_ERROR", "Invalid input").with_fields(fields),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", msg),
                )
            }
            AppError::Repository(e) => {
                tracing::error!("Repository error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("REPOSITORY_ERROR", e.to_string()),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthenticated => AppError::Unauthorized(err.to_string()),
            ServiceError::PermissionDenied => AppError::Forbidden(err.to_string()),
            ServiceError::Validation(fields) => AppError::BadRequest(fields),
            ServiceError::NotFound(msg) => AppError::NotFound(msg),
            ServiceError::Repository(e) => AppError::Repository(e),
            ServiceError::Media(msg) | ServiceError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(FieldErrors::single("image", err.body_text()))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let fields = match &rejection {
            JsonRejection::JsonDataError(err) => deserialize_errors(&err.body_text()),
            other => FieldErrors::single(NON_FIELD_ERRORS, other.body_text()),
        };
        AppError::BadRequest(fields)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(deserialize_errors(&rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::NotFound(rejection.body_text())
    }
}

/// Turn `"<summary>: <path>: <message>"` from a serde rejection into a field
/// error keyed by the offending path.
fn deserialize_errors(detail: &str) -> FieldErrors {
    let inner = detail.split_once(": ").map_or(detail, |(_, rest)| rest);
    match inner.split_once(": ") {
        Some((path, message)) if is_field_path(path) => FieldErrors::single(path, message),
        _ => FieldErrors::single(NON_FIELD_ERRORS, inner),
    }
}

fn is_field_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::RepositoryError;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ServiceError::PermissionDenied, StatusCode::FORBIDDEN),
            (ServiceError::invalid("title", "bad"), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("gone"), StatusCode::NOT_FOUND),
            (
                ServiceError::Repository(RepositoryError::connection("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_deserialize_errors_key_by_path() {
        let fields = deserialize_errors(
            "Failed to deserialize the JSON body into the target type: seconds: invalid type: string \"soon\", expected i64",
        );
        assert_eq!(
            fields.get("seconds"),
            Some(&["invalid type: string \"soon\", expected i64".to_string()][..])
        );

        let fields = deserialize_errors(
            "Failed to deserialize the JSON body into the target type: invalid type: sequence, expected a map",
        );
        assert!(fields.get("seconds").is_none());
        assert!(fields.get(NON_FIELD_ERRORS).is_some());
    }
}
