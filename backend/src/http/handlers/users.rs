//! `/api/user` endpoints: accounts, tokens and the follow graph.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::HandlerResult;
use crate::http::dto::{
    CredentialsInput, FollowResponse, MessageResponse, PostSummary, ProfileInfo, TokenResponse,
    UserResponse,
};
use crate::http::error::AppError;
use crate::http::extract::{AuthUser, JsonBody, PathParam};
use crate::http::state::AppState;
use crate::models::UserId;
use crate::services::{auth, follows, posts};

/// POST /api/user/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CredentialsInput>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = auth::register(state.repository.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CredentialsInput>,
) -> HandlerResult<TokenResponse> {
    let token = auth::login(state.repository.as_ref(), input).await?;
    Ok(Json(TokenResponse { token }))
}

/// GET|POST /api/user/logout
///
/// Revokes only the token used for this request.
pub async fn logout(
    State(state): State<AppState>,
    caller: AuthUser,
) -> HandlerResult<MessageResponse> {
    auth::logout(state.repository.as_ref(), &caller.token).await?;
    Ok(Json(MessageResponse::new("Logged out.")))
}

/// GET /api/user/me
pub async fn me(caller: AuthUser) -> HandlerResult<UserResponse> {
    Ok(Json(UserResponse::from(&caller.user)))
}

/// PUT|PATCH /api/user/me
pub async fn update_me(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(input): JsonBody<CredentialsInput>,
) -> HandlerResult<UserResponse> {
    let user = auth::update_account(state.repository.as_ref(), &caller.user, input).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/user/me
pub async fn delete_me(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<StatusCode, AppError> {
    auth::delete_account(state.repository.as_ref(), caller.user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/user/me/posts
pub async fn my_posts(
    State(state): State<AppState>,
    caller: AuthUser,
) -> HandlerResult<Vec<PostSummary>> {
    let posts = posts::my_posts(state.repository.as_ref(), &caller.user).await?;
    Ok(Json(posts.iter().map(PostSummary::from).collect()))
}

/// POST /api/user/me/follow/{id}
pub async fn follow(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(user_id): PathParam<i64>,
) -> Result<(StatusCode, Json<FollowResponse>), AppError> {
    let edge = follows::follow(state.repository.as_ref(), &caller.user, UserId::new(user_id)).await?;
    Ok((StatusCode::CREATED, Json(FollowResponse::from(&edge))))
}

/// GET|POST|DELETE /api/user/me/unfollow/{id}
pub async fn unfollow(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(user_id): PathParam<i64>,
) -> HandlerResult<MessageResponse> {
    follows::unfollow(state.repository.as_ref(), &caller.user, UserId::new(user_id)).await?;
    Ok(Json(MessageResponse::new(format!("Unfollowed user {}.", user_id))))
}

/// GET /api/user/me/followers
pub async fn my_followers(
    State(state): State<AppState>,
    caller: AuthUser,
) -> HandlerResult<Vec<ProfileInfo>> {
    let profiles = follows::my_followers(state.repository.as_ref(), &caller.user).await?;
    Ok(Json(profiles.iter().map(ProfileInfo::from).collect()))
}

/// GET /api/user/me/following
pub async fn my_following(
    State(state): State<AppState>,
    caller: AuthUser,
) -> HandlerResult<Vec<ProfileInfo>> {
    let profiles = follows::my_following(state.repository.as_ref(), &caller.user).await?;
    Ok(Json(profiles.iter().map(ProfileInfo::from).collect()))
}

/// GET /api/user/me/following/posts
pub async fn following_posts(
    State(state): State<AppState>,
    caller: AuthUser,
) -> HandlerResult<Vec<PostSummary>> {
    let posts = follows::following_posts(state.repository.as_ref(), &caller.user).await?;
    Ok(Json(posts.iter().map(PostSummary::from).collect()))
}
