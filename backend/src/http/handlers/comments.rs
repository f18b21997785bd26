//! `/api/social_media/comments` endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::HandlerResult;
use crate::http::dto::{CommentInput, CommentQuery, CommentResponse};
use crate::http::error::AppError;
use crate::http::extract::{AuthUser, JsonBody, PathParam, QueryParams};
use crate::http::state::AppState;
use crate::models::CommentId;
use crate::services::comments;

/// GET /comments?post=
pub async fn list_comments(
    State(state): State<AppState>,
    _caller: AuthUser,
    QueryParams(query): QueryParams<CommentQuery>,
) -> HandlerResult<Vec<CommentResponse>> {
    let comments = comments::list_comments(state.repository.as_ref(), query.post).await?;
    Ok(Json(comments.iter().map(CommentResponse::from).collect()))
}

/// GET /comments/{id}
pub async fn get_comment(
    State(state): State<AppState>,
    _caller: AuthUser,
    PathParam(comment_id): PathParam<i64>,
) -> HandlerResult<CommentResponse> {
    let comment = comments::get_comment(state.repository.as_ref(), CommentId::new(comment_id)).await?;
    Ok(Json(CommentResponse::from(&comment)))
}

/// PUT|PATCH /comments/{id}
///
/// `text` is the only writable field, so both methods behave the same.
pub async fn update_comment(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(comment_id): PathParam<i64>,
    JsonBody(input): JsonBody<CommentInput>,
) -> HandlerResult<CommentResponse> {
    let comment = comments::update_comment(
        state.repository.as_ref(),
        &caller.user,
        CommentId::new(comment_id),
        input,
    )
    .await?;
    Ok(Json(CommentResponse::from(&comment)))
}

/// DELETE /comments/{id}
pub async fn delete_comment(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(comment_id): PathParam<i64>,
) -> Result<StatusCode, AppError> {
    comments::delete_comment(
        state.repository.as_ref(),
        &caller.user,
        CommentId::new(comment_id),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
