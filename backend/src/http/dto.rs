//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies and query strings deserialize straight into the model
//! input types; response shapes live in [`crate::api`].

use serde::{Deserialize, Serialize};

pub use crate::api::{
    CommentResponse, FollowResponse, ImageResponse, MessageResponse, PostDetail, PostSummary,
    ProfileDetail, ProfileInfo, ProfileSummary, ScheduledPostResponse, TokenResponse,
    UserResponse,
};
pub use crate::models::{
    CommentInput, CredentialsInput, PostFilter, PostInput, ProfileFilter, ProfileInput,
};
use crate::models::PostId;

/// Query parameters for the comment list.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommentQuery {
    /// Only comments on this post
    #[serde(default)]
    pub post: Option<PostId>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}
