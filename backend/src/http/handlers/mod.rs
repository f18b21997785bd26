//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

pub mod comments;
pub mod posts;
pub mod profiles;
pub mod users;

use axum::{
    extract::{Multipart, State},
    Json,
};

use super::dto::HealthResponse;
use super::error::AppError;
use super::state::AppState;
use crate::models::FieldErrors;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Multipart field carrying an uploaded image.
const IMAGE_FIELD: &str = "image";

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

/// Read the `image` part of a multipart upload.
async fn read_image(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            return Ok(field.bytes().await?.to_vec());
        }
    }
    Err(AppError::BadRequest(FieldErrors::single(
        IMAGE_FIELD,
        "No file was submitted.",
    )))
}
