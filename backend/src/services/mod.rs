//! Service layer.
//!
//! Repository-agnostic operations behind the HTTP handlers: validation,
//! ownership checks, authentication, image storage and delayed submission.
//! Functions take any [`FullRepository`](crate::db::repository::FullRepository)
//! so they run unchanged against the in-memory and Postgres backends.

pub mod auth;
pub mod comments;
pub mod delayed;
pub mod error;
pub mod follows;
pub mod media;
pub mod posts;
pub mod profiles;

pub use delayed::{DelayedPost, PostQueue, ScheduledPost, TokioPostQueue};
pub use error::{ServiceError, ServiceResult};
pub use media::{MediaCategory, MediaStore};

use crate::models::{User, UserId};

/// Only the owner may change a record.
pub fn ensure_owner(user: &User, owner: UserId) -> ServiceResult<()> {
    if user.id == owner {
        Ok(())
    } else {
        Err(ServiceError::PermissionDenied)
    }
}
