use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Post, PostDraft, PostFilter, PostId, PostPatch, UserId};

/// Repository trait for posts.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, author: UserId, draft: &PostDraft) -> RepositoryResult<Post>;

    /// Returns `RepositoryError::NotFound` when the post doesn't exist.
    async fn get_post(&self, post_id: PostId) -> RepositoryResult<Post>;

    /// All posts matching the filter, ordered by id.
    async fn list_posts(&self, filter: &PostFilter) -> RepositoryResult<Vec<Post>>;

    /// All posts written by any of the given users, ordered by id.
    async fn posts_by_users(&self, user_ids: &[UserId]) -> RepositoryResult<Vec<Post>>;

    /// Fetch several posts at once, ordered by id; missing ids are skipped.
    async fn posts_by_ids(&self, post_ids: &[PostId]) -> RepositoryResult<Vec<Post>>;

    async fn update_post(&self, post_id: PostId, patch: &PostPatch) -> RepositoryResult<Post>;

    async fn set_post_image(&self, post_id: PostId, image: Option<&str>)
        -> RepositoryResult<Post>;

    /// Delete a post and its likes and comments.
    async fn delete_post(&self, post_id: PostId) -> RepositoryResult<()>;
}
