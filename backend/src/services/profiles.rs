//! Profile operations.

use log::info;

use super::error::ServiceResult;
use super::media::{MediaCategory, MediaStore};
use super::ensure_owner;
use crate::db::repository::FullRepository;
use crate::models::{Profile, ProfileFilter, ProfileId, ProfileInput, ProfilePatch, User};

/// A profile together with the profiles of users following its owner.
#[derive(Debug, Clone)]
pub struct ProfileDetails {
    pub profile: Profile,
    pub followers: Vec<Profile>,
}

pub async fn list_profiles<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &ProfileFilter,
) -> ServiceResult<Vec<Profile>> {
    Ok(repo.list_profiles(filter).await?)
}

pub async fn create_profile<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    input: ProfileInput,
) -> ServiceResult<Profile> {
    let draft = input.into_draft()?;
    let profile = repo.create_profile(user.id, &draft).await?;
    info!("User {} created profile {}", user.id, profile.id);
    Ok(profile)
}

pub async fn profile_details<R: FullRepository + ?Sized>(
    repo: &R,
    profile_id: ProfileId,
) -> ServiceResult<ProfileDetails> {
    let profile = repo.get_profile(profile_id).await?;
    let follower_ids = repo.followers_of(profile.user_id).await?;
    let followers = repo.profiles_for_users(&follower_ids).await?;
    Ok(ProfileDetails { profile, followers })
}

/// Replace (`partial = false`) or patch a profile the caller owns.
pub async fn update_profile<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    profile_id: ProfileId,
    input: ProfileInput,
    partial: bool,
) -> ServiceResult<Profile> {
    let profile = repo.get_profile(profile_id).await?;
    ensure_owner(user, profile.user_id)?;

    let patch = if partial {
        input.into_patch()?
    } else {
        ProfilePatch::from(input.into_draft()?)
    };
    Ok(repo.update_profile(profile_id, &patch).await?)
}

pub async fn delete_profile<R: FullRepository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    user: &User,
    profile_id: ProfileId,
) -> ServiceResult<()> {
    let profile = repo.get_profile(profile_id).await?;
    ensure_owner(user, profile.user_id)?;
    repo.delete_profile(profile_id).await?;
    if let Some(image) = &profile.image {
        media.remove(image).await;
    }
    Ok(())
}

/// Store a new profile image, replacing any previous file.
pub async fn upload_profile_image<R: FullRepository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    user: &User,
    profile_id: ProfileId,
    bytes: &[u8],
) -> ServiceResult<Profile> {
    let profile = repo.get_profile(profile_id).await?;
    ensure_owner(user, profile.user_id)?;

    let path = media
        .save_image(MediaCategory::Profiles, &profile.username, bytes)
        .await?;
    let updated = match repo.set_profile_image(profile_id, Some(&path)).await {
        Ok(updated) => updated,
        Err(e) => {
            media.remove(&path).await;
            return Err(e.into());
        }
    };
    if let Some(previous) = &profile.image {
        media.remove(previous).await;
    }
    Ok(updated)
}
