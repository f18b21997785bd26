//! Follow graph persistence.
//!
//! Edges are stored as `(user_id, following_user_id)` where the second user
//! follows the first. See [`crate::models::UserFollowing`].

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{UserFollowing, UserId};

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// The edge "`follower` follows `user_id`", if present.
    async fn find_following(
        &self,
        user_id: UserId,
        follower: UserId,
    ) -> RepositoryResult<Option<UserFollowing>>;

    /// Insert the edge "`follower` follows `user_id`".
    async fn create_following(
        &self,
        user_id: UserId,
        follower: UserId,
    ) -> RepositoryResult<UserFollowing>;

    /// Delete the exact edge. Returns whether a row was removed.
    async fn delete_following(&self, user_id: UserId, follower: UserId) -> RepositoryResult<bool>;

    /// Users that `follower` follows, in edge insertion order.
    async fn followed_by(&self, follower: UserId) -> RepositoryResult<Vec<UserId>>;

    /// Users following `user_id`, in edge insertion order.
    async fn followers_of(&self, user_id: UserId) -> RepositoryResult<Vec<UserId>>;
}
