//! Public API surface: the JSON representations returned by the HTTP API.
//!
//! List endpoints use the compact shapes (`ProfileSummary`, `PostSummary`);
//! single-record endpoints use the detail shapes. Image fields carry public
//! URLs, never storage paths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    CommentId, Post, PostComment, PostDraft, PostId, PostThread, Profile, ProfileId, User,
    UserFollowing, UserId,
};
use crate::services::media::MediaStore;
use crate::services::profiles::ProfileDetails;
use crate::services::ScheduledPost;

fn image_url(media: &MediaStore, path: &Option<String>) -> Option<String> {
    path.as_deref().map(|p| media.url_for(p))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub is_staff: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_staff: user.is_staff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub detail: String,
}

impl MessageResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// A follow edge as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowResponse {
    /// The user being followed
    pub user: UserId,
    pub follower: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<&UserFollowing> for FollowResponse {
    fn from(edge: &UserFollowing) -> Self {
        Self {
            user: edge.followed(),
            follower: edge.follower(),
            created_at: edge.created_at,
        }
    }
}

// =============================================================================
// Profiles
// =============================================================================

/// List shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: ProfileId,
    pub bio: String,
    pub username: String,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            bio: profile.bio.clone(),
            username: profile.username.clone(),
        }
    }
}

/// Shape used for follower/following listings and write responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub id: ProfileId,
    pub bio: String,
    pub address: String,
    pub username: String,
}

impl From<&Profile> for ProfileInfo {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            bio: profile.bio.clone(),
            address: profile.address.clone(),
            username: profile.username.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerName {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetail {
    pub id: ProfileId,
    pub user: UserId,
    pub bio: String,
    pub address: String,
    pub username: String,
    /// Usernames of profiles whose owners follow this profile's owner.
    pub followers: Vec<FollowerName>,
    pub image: Option<String>,
}

impl ProfileDetail {
    pub fn new(details: &ProfileDetails, media: &MediaStore) -> Self {
        let profile = &details.profile;
        Self {
            id: profile.id,
            user: profile.user_id,
            bio: profile.bio.clone(),
            address: profile.address.clone(),
            username: profile.username.clone(),
            followers: details
                .followers
                .iter()
                .map(|f| FollowerName {
                    username: f.username.clone(),
                })
                .collect(),
            image: image_url(media, &profile.image),
        }
    }
}

/// Returned by image uploads on profiles and posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub id: i64,
    pub image: Option<String>,
}

impl ImageResponse {
    pub fn for_profile(profile: &Profile, media: &MediaStore) -> Self {
        Self {
            id: profile.id.value(),
            image: image_url(media, &profile.image),
        }
    }

    pub fn for_post(post: &Post, media: &MediaStore) -> Self {
        Self {
            id: post.id.value(),
            image: image_url(media, &post.image),
        }
    }
}

// =============================================================================
// Posts
// =============================================================================

/// List shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
    pub user: UserId,
    pub title: String,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            user: post.user_id,
            title: post.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeEntry {
    pub user: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEntry {
    pub id: CommentId,
    pub user: UserId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: PostId,
    pub user: UserId,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub likes: Vec<LikeEntry>,
    pub comments: Vec<CommentEntry>,
}

impl PostDetail {
    pub fn new(thread: &PostThread, media: &MediaStore) -> Self {
        let post = &thread.post;
        Self {
            id: post.id,
            user: post.user_id,
            title: post.title.clone(),
            text: post.text.clone(),
            image: image_url(media, &post.image),
            created_at: post.created_at,
            likes: thread
                .likes
                .iter()
                .map(|l| LikeEntry {
                    user: l.user_id,
                    created_at: l.created_at,
                })
                .collect(),
            comments: thread
                .comments
                .iter()
                .map(|c| CommentEntry {
                    id: c.id,
                    user: c.user_id,
                    text: c.text.clone(),
                })
                .collect(),
        }
    }
}

/// Echo of a post handed to the delayed queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPostResponse {
    pub title: String,
    pub text: String,
    pub seconds: i64,
    pub job_id: String,
    pub scheduled_for: DateTime<Utc>,
}

impl ScheduledPostResponse {
    pub fn new(draft: &PostDraft, seconds: i64, receipt: &ScheduledPost) -> Self {
        Self {
            title: draft.title.clone(),
            text: draft.text.clone(),
            seconds,
            job_id: receipt.job_id.clone(),
            scheduled_for: receipt.run_at,
        }
    }
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: CommentId,
    pub user: UserId,
    pub text: String,
    pub post: PostId,
}

impl From<&PostComment> for CommentResponse {
    fn from(comment: &PostComment) -> Self {
        Self {
            id: comment.id,
            user: comment.user_id,
            text: comment.text.clone(),
            post: comment.post_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LikeId, PostLike};

    #[test]
    fn test_post_detail_shape() {
        let media = MediaStore::new("/tmp/unused", "/media", 1024);
        let now = Utc::now();
        let thread = PostThread {
            post: Post {
                id: PostId::new(3),
                user_id: UserId::new(1),
                title: "Hello".to_string(),
                text: "World".to_string(),
                image: Some("uploads/posts/hello-1.png".to_string()),
                created_at: now,
            },
            likes: vec![PostLike {
                id: LikeId::new(9),
                user_id: UserId::new(2),
                post_id: PostId::new(3),
                created_at: now,
            }],
            comments: vec![],
        };

        let json = serde_json::to_value(PostDetail::new(&thread, &media)).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["user"], 1);
        assert_eq!(json["image"], "/media/uploads/posts/hello-1.png");
        assert_eq!(json["likes"][0]["user"], 2);
        assert!(json["likes"][0].get("id").is_none());
        assert_eq!(json["comments"], serde_json::json!([]));
    }

    #[test]
    fn test_profile_summary_omits_address() {
        let profile = Profile {
            id: ProfileId::new(1),
            user_id: UserId::new(1),
            bio: "bio".to_string(),
            address: "secret street".to_string(),
            username: "alice".to_string(),
            image: None,
        };
        let json = serde_json::to_value(ProfileSummary::from(&profile)).unwrap();
        assert!(json.get("address").is_none());
        assert_eq!(json["username"], "alice");
    }
}
