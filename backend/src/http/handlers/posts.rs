//! `/api/social_media/posts` endpoints, including likes and comments.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::{read_image, HandlerResult};
use crate::http::dto::{
    CommentInput, ImageResponse, PostDetail, PostFilter, PostInput, PostSummary,
    ScheduledPostResponse,
};
use crate::http::error::AppError;
use crate::http::extract::{AuthUser, JsonBody, PathParam, QueryParams};
use crate::http::state::AppState;
use crate::models::PostId;
use crate::services::posts::{self, CreatedPost};

/// GET /posts?title=&text=
pub async fn list_posts(
    State(state): State<AppState>,
    _caller: AuthUser,
    QueryParams(filter): QueryParams<PostFilter>,
) -> HandlerResult<Vec<PostSummary>> {
    let posts = posts::list_posts(state.repository.as_ref(), &filter).await?;
    Ok(Json(posts.iter().map(PostSummary::from).collect()))
}

/// POST /posts
///
/// With `seconds` the post goes to the delayed queue and the response is
/// 202 with the accepted payload; otherwise 201 with the stored post.
pub async fn create_post(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(input): JsonBody<PostInput>,
) -> Result<Response, AppError> {
    let created = posts::create_post(
        state.repository.as_ref(),
        state.post_queue.as_ref(),
        &caller.user,
        input,
    )
    .await?;

    let response = match created {
        CreatedPost::Now(thread) => (
            StatusCode::CREATED,
            Json(PostDetail::new(&thread, &state.media)),
        )
            .into_response(),
        CreatedPost::Scheduled {
            draft,
            seconds,
            receipt,
        } => (
            StatusCode::ACCEPTED,
            Json(ScheduledPostResponse::new(&draft, seconds, &receipt)),
        )
            .into_response(),
    };
    Ok(response)
}

/// GET /posts/liked
pub async fn liked_posts(
    State(state): State<AppState>,
    caller: AuthUser,
) -> HandlerResult<Vec<PostDetail>> {
    let threads = posts::liked_posts(state.repository.as_ref(), &caller.user).await?;
    Ok(Json(
        threads
            .iter()
            .map(|t| PostDetail::new(t, &state.media))
            .collect(),
    ))
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    _caller: AuthUser,
    PathParam(post_id): PathParam<i64>,
) -> HandlerResult<PostDetail> {
    let thread = posts::post_thread(state.repository.as_ref(), PostId::new(post_id)).await?;
    Ok(Json(PostDetail::new(&thread, &state.media)))
}

/// PUT /posts/{id}
pub async fn replace_post(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(post_id): PathParam<i64>,
    JsonBody(input): JsonBody<PostInput>,
) -> HandlerResult<PostDetail> {
    update(state, caller, post_id, input, false).await
}

/// PATCH /posts/{id}
pub async fn patch_post(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(post_id): PathParam<i64>,
    JsonBody(input): JsonBody<PostInput>,
) -> HandlerResult<PostDetail> {
    update(state, caller, post_id, input, true).await
}

async fn update(
    state: AppState,
    caller: AuthUser,
    post_id: i64,
    input: PostInput,
    partial: bool,
) -> HandlerResult<PostDetail> {
    let thread = posts::update_post(
        state.repository.as_ref(),
        &caller.user,
        PostId::new(post_id),
        input,
        partial,
    )
    .await?;
    Ok(Json(PostDetail::new(&thread, &state.media)))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(post_id): PathParam<i64>,
) -> Result<StatusCode, AppError> {
    posts::delete_post(
        state.repository.as_ref(),
        &state.media,
        &caller.user,
        PostId::new(post_id),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /posts/{id}/upload-image
pub async fn upload_image(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(post_id): PathParam<i64>,
    multipart: Multipart,
) -> HandlerResult<ImageResponse> {
    let bytes = read_image(multipart).await?;
    let post = posts::upload_post_image(
        state.repository.as_ref(),
        &state.media,
        &caller.user,
        PostId::new(post_id),
        &bytes,
    )
    .await?;
    Ok(Json(ImageResponse::for_post(&post, &state.media)))
}

/// POST /posts/{id}/like
pub async fn like(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(post_id): PathParam<i64>,
) -> HandlerResult<PostDetail> {
    let thread =
        posts::like_post(state.repository.as_ref(), &caller.user, PostId::new(post_id)).await?;
    Ok(Json(PostDetail::new(&thread, &state.media)))
}

/// POST /posts/{id}/unlike
pub async fn unlike(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(post_id): PathParam<i64>,
) -> HandlerResult<PostDetail> {
    let thread =
        posts::unlike_post(state.repository.as_ref(), &caller.user, PostId::new(post_id)).await?;
    Ok(Json(PostDetail::new(&thread, &state.media)))
}

/// POST /posts/{id}/comment
pub async fn comment(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(post_id): PathParam<i64>,
    JsonBody(input): JsonBody<CommentInput>,
) -> HandlerResult<PostDetail> {
    let thread = posts::comment_on_post(
        state.repository.as_ref(),
        &caller.user,
        PostId::new(post_id),
        input,
    )
    .await?;
    Ok(Json(PostDetail::new(&thread, &state.media)))
}
