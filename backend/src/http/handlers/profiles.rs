//! `/api/social_media/profiles` endpoints.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use super::{read_image, HandlerResult};
use crate::http::dto::{
    ImageResponse, ProfileDetail, ProfileFilter, ProfileInfo, ProfileInput, ProfileSummary,
};
use crate::http::error::AppError;
use crate::http::extract::{AuthUser, JsonBody, PathParam, QueryParams};
use crate::http::state::AppState;
use crate::models::ProfileId;
use crate::services::profiles;

/// GET /profiles?bio=&address=&username=
pub async fn list_profiles(
    State(state): State<AppState>,
    _caller: AuthUser,
    QueryParams(filter): QueryParams<ProfileFilter>,
) -> HandlerResult<Vec<ProfileSummary>> {
    let profiles = profiles::list_profiles(state.repository.as_ref(), &filter).await?;
    Ok(Json(profiles.iter().map(ProfileSummary::from).collect()))
}

/// POST /profiles
pub async fn create_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(input): JsonBody<ProfileInput>,
) -> Result<(StatusCode, Json<ProfileInfo>), AppError> {
    let profile = profiles::create_profile(state.repository.as_ref(), &caller.user, input).await?;
    Ok((StatusCode::CREATED, Json(ProfileInfo::from(&profile))))
}

/// GET /profiles/{id}
pub async fn get_profile(
    State(state): State<AppState>,
    _caller: AuthUser,
    PathParam(profile_id): PathParam<i64>,
) -> HandlerResult<ProfileDetail> {
    let details =
        profiles::profile_details(state.repository.as_ref(), ProfileId::new(profile_id)).await?;
    Ok(Json(ProfileDetail::new(&details, &state.media)))
}

/// PUT /profiles/{id}
pub async fn replace_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(profile_id): PathParam<i64>,
    JsonBody(input): JsonBody<ProfileInput>,
) -> HandlerResult<ProfileInfo> {
    update(state, caller, profile_id, input, false).await
}

/// PATCH /profiles/{id}
pub async fn patch_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(profile_id): PathParam<i64>,
    JsonBody(input): JsonBody<ProfileInput>,
) -> HandlerResult<ProfileInfo> {
    update(state, caller, profile_id, input, true).await
}

async fn update(
    state: AppState,
    caller: AuthUser,
    profile_id: i64,
    input: ProfileInput,
    partial: bool,
) -> HandlerResult<ProfileInfo> {
    let profile = profiles::update_profile(
        state.repository.as_ref(),
        &caller.user,
        ProfileId::new(profile_id),
        input,
        partial,
    )
    .await?;
    Ok(Json(ProfileInfo::from(&profile)))
}

/// DELETE /profiles/{id}
pub async fn delete_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(profile_id): PathParam<i64>,
) -> Result<StatusCode, AppError> {
    profiles::delete_profile(
        state.repository.as_ref(),
        &state.media,
        &caller.user,
        ProfileId::new(profile_id),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /profiles/{id}/upload-image
pub async fn upload_image(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(profile_id): PathParam<i64>,
    multipart: Multipart,
) -> HandlerResult<ImageResponse> {
    let bytes = read_image(multipart).await?;
    let profile = profiles::upload_profile_image(
        state.repository.as_ref(),
        &state.media,
        &caller.user,
        ProfileId::new(profile_id),
        &bytes,
    )
    .await?;
    Ok(Json(ImageResponse::for_profile(&profile, &state.media)))
}
