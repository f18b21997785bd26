//! Likes and comments.
//!
//! Both record kinds are always scoped to a single post. Like uniqueness per
//! `(user, post)` is maintained here through [`EngagementRepository::replace_like`],
//! not by a schema constraint.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{CommentId, PostComment, PostId, PostLike, UserId};

#[async_trait]
pub trait EngagementRepository: Send + Sync {
    // ==================== Likes ====================

    /// Likes on a post, oldest first.
    async fn likes_for_post(&self, post_id: PostId) -> RepositoryResult<Vec<PostLike>>;

    /// Drop any like `user_id` already has on the post, then insert a fresh one.
    ///
    /// Both steps happen atomically so the pair never ends up with two rows.
    async fn replace_like(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<PostLike>;

    /// Delete the user's likes on a post. Returns the number of removed rows.
    async fn delete_likes(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<usize>;

    /// Ids of posts the user likes, ordered by post id.
    async fn liked_post_ids(&self, user_id: UserId) -> RepositoryResult<Vec<PostId>>;

    // ==================== Comments ====================

    async fn create_comment(
        &self,
        user_id: UserId,
        post_id: PostId,
        text: &str,
    ) -> RepositoryResult<PostComment>;

    async fn get_comment(&self, comment_id: CommentId) -> RepositoryResult<PostComment>;

    /// Comments ordered by id, optionally restricted to one post.
    async fn list_comments(&self, post_id: Option<PostId>) -> RepositoryResult<Vec<PostComment>>;

    async fn update_comment(
        &self,
        comment_id: CommentId,
        text: &str,
    ) -> RepositoryResult<PostComment>;

    async fn delete_comment(&self, comment_id: CommentId) -> RepositoryResult<()>;
}
