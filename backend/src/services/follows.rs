//! Follow graph operations.
//!
//! Edge direction: the stored row `(user_id = A, following_user_id = B)`
//! means B follows A. Following someone therefore writes their id into
//! `user_id` and the caller's id into `following_user_id`.

use log::info;

use super::error::{ServiceError, ServiceResult};
use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::validation::NON_FIELD_ERRORS;
use crate::models::{Post, Profile, User, UserFollowing, UserId};

/// Make `me` follow `target`. Following twice keeps a single edge.
pub async fn follow<R: FullRepository + ?Sized>(
    repo: &R,
    me: &User,
    target: UserId,
) -> ServiceResult<UserFollowing> {
    if target == me.id {
        return Err(ServiceError::invalid(
            NON_FIELD_ERRORS,
            "You cannot follow yourself.",
        ));
    }
    match repo.get_user(target).await {
        Ok(_) => {}
        Err(RepositoryError::NotFound { .. }) => {
            return Err(ServiceError::not_found(format!("User {} not found", target)))
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(existing) = repo.find_following(target, me.id).await? {
        return Ok(existing);
    }
    let edge = repo.create_following(target, me.id).await?;
    info!("User {} now follows user {}", me.id, target);
    Ok(edge)
}

/// Remove the edge "`me` follows `target`".
pub async fn unfollow<R: FullRepository + ?Sized>(
    repo: &R,
    me: &User,
    target: UserId,
) -> ServiceResult<()> {
    if !repo.delete_following(target, me.id).await? {
        return Err(ServiceError::not_found(format!(
            "You are not following user {}",
            target
        )));
    }
    info!("User {} unfollowed user {}", me.id, target);
    Ok(())
}

/// Profiles of users following `me`.
pub async fn my_followers<R: FullRepository + ?Sized>(
    repo: &R,
    me: &User,
) -> ServiceResult<Vec<Profile>> {
    let ids = repo.followers_of(me.id).await?;
    Ok(repo.profiles_for_users(&ids).await?)
}

/// Profiles of users `me` follows.
pub async fn my_following<R: FullRepository + ?Sized>(
    repo: &R,
    me: &User,
) -> ServiceResult<Vec<Profile>> {
    let ids = repo.followed_by(me.id).await?;
    Ok(repo.profiles_for_users(&ids).await?)
}

/// Posts written by users `me` follows.
pub async fn following_posts<R: FullRepository + ?Sized>(
    repo: &R,
    me: &User,
) -> ServiceResult<Vec<Post>> {
    let ids = repo.followed_by(me.id).await?;
    Ok(repo.posts_by_users(&ids).await?)
}
