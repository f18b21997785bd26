use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Profile, ProfileDraft, ProfileFilter, ProfileId, ProfilePatch, UserId};

/// Repository trait for profiles.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create_profile(
        &self,
        owner: UserId,
        draft: &ProfileDraft,
    ) -> RepositoryResult<Profile>;

    /// Returns `RepositoryError::NotFound` when the profile doesn't exist.
    async fn get_profile(&self, profile_id: ProfileId) -> RepositoryResult<Profile>;

    /// All profiles matching the filter, ordered by id.
    async fn list_profiles(&self, filter: &ProfileFilter) -> RepositoryResult<Vec<Profile>>;

    /// All profiles owned by any of the given users, ordered by id.
    async fn profiles_for_users(&self, user_ids: &[UserId]) -> RepositoryResult<Vec<Profile>>;

    async fn update_profile(
        &self,
        profile_id: ProfileId,
        patch: &ProfilePatch,
    ) -> RepositoryResult<Profile>;

    /// Set or clear the stored image path.
    async fn set_profile_image(
        &self,
        profile_id: ProfileId,
        image: Option<&str>,
    ) -> RepositoryResult<Profile>;

    async fn delete_profile(&self, profile_id: ProfileId) -> RepositoryResult<()>;
}
