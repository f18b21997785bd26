//! Errors raised by the service layer.

use crate::db::repository::RepositoryError;
use crate::models::FieldErrors;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No token, or a token that matches no session.
    #[error("Authentication credentials were not provided or are invalid")]
    Unauthenticated,

    /// The caller does not own the record it tried to change.
    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("{0}")]
    NotFound(String),

    /// Storing or reading an uploaded file failed.
    #[error("Media error: {0}")]
    Media(String),

    #[error(transparent)]
    Repository(RepositoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { message, .. } => Self::NotFound(message),
            other => Self::Repository(other),
        }
    }
}
