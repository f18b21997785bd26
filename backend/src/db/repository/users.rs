//! Account and token persistence.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{AuthToken, NewUser, User, UserChanges, UserId};

/// Repository trait for users and their login tokens.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait UserRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the database connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Users ====================

    /// Store a new user.
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user with its assigned id
    /// * `Err(RepositoryError::Conflict)` - If the email is already taken
    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;

    /// Retrieve a user by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the user doesn't exist
    async fn get_user(&self, user_id: UserId) -> RepositoryResult<User>;

    /// Look a user up by (already normalized) email.
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Apply a partial update. An empty change set returns the user unchanged.
    async fn update_user(&self, user_id: UserId, changes: &UserChanges) -> RepositoryResult<User>;

    /// Delete a user together with their tokens, profiles, posts, likes and
    /// comments. Follow edges mentioning the user are left in place.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the user doesn't exist
    async fn delete_user(&self, user_id: UserId) -> RepositoryResult<()>;

    // ==================== Tokens ====================

    /// Persist an issued token digest.
    async fn store_token(&self, token: &AuthToken) -> RepositoryResult<()>;

    /// Find a token by its digest.
    async fn find_token(&self, digest: &str) -> RepositoryResult<Option<AuthToken>>;

    /// Remove a token. Returns whether a row was deleted.
    async fn delete_token(&self, digest: &str) -> RepositoryResult<bool>;
}
