//! Repository trait definitions for database operations.
//!
//! Persistence is split into focused traits so each backend implementation
//! stays readable and each service function can name exactly what it needs.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`users`]: Accounts and auth tokens
//! - [`profiles`]: Profile CRUD and lookups by owner
//! - [`posts`]: Post CRUD and lookups by author
//! - [`engagement`]: Likes and comments attached to posts
//! - [`follows`]: Follow edges between users
//!
//! # Convenience Trait Bound
//!
//! For functions that need all repository capabilities, use the [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let post = repo.get_post(post_id).await?;
//!     repo.replace_like(user_id, post.id).await?;
//!     Ok(())
//! }
//! ```

pub mod engagement;
pub mod error;
pub mod follows;
pub mod posts;
pub mod profiles;
pub mod users;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use engagement::EngagementRepository;
pub use follows::FollowRepository;
pub use posts::PostRepository;
pub use profiles::ProfileRepository;
pub use users::UserRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements all five
/// repository traits.
pub trait FullRepository:
    UserRepository + ProfileRepository + PostRepository + EngagementRepository + FollowRepository
{
}

impl<T> FullRepository for T where
    T: UserRepository
        + ProfileRepository
        + PostRepository
        + EngagementRepository
        + FollowRepository
{
}
