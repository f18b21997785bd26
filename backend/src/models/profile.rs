//! User-facing profiles.

use serde::Deserialize;

use super::user::UserId;
use super::validation::FieldErrors;
use crate::define_id_type;

define_id_type!(i64, ProfileId);

pub const ADDRESS_MAX_LEN: usize = 255;
pub const USERNAME_MAX_LEN: usize = 30;

/// Profile record. A user may own several; nothing enforces one per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub bio: String,
    pub address: String,
    pub username: String,
    /// Path relative to the media root.
    pub image: Option<String>,
}

/// Validated content for a new profile or a full replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub bio: String,
    pub address: String,
    pub username: String,
}

/// Validated partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub address: Option<String>,
    pub username: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.bio.is_none() && self.address.is_none() && self.username.is_none()
    }
}

impl From<ProfileDraft> for ProfilePatch {
    fn from(draft: ProfileDraft) -> Self {
        Self {
            bio: Some(draft.bio),
            address: Some(draft.address),
            username: Some(draft.username),
        }
    }
}

/// Case-insensitive substring filters; every present filter must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFilter {
    pub bio: Option<String>,
    pub address: Option<String>,
    pub username: Option<String>,
}

impl ProfileFilter {
    pub fn matches(&self, profile: &Profile) -> bool {
        contains_ci(&profile.bio, self.bio.as_deref())
            && contains_ci(&profile.address, self.address.as_deref())
            && contains_ci(&profile.username, self.username.as_deref())
    }
}

/// Raw profile payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    pub bio: Option<String>,
    pub address: Option<String>,
    pub username: Option<String>,
}

impl ProfileInput {
    pub fn into_draft(self) -> Result<ProfileDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let bio = errors.require_text("bio", self.bio.as_deref(), None);
        let address = errors.require_text("address", self.address.as_deref(), Some(ADDRESS_MAX_LEN));
        let username =
            errors.require_text("username", self.username.as_deref(), Some(USERNAME_MAX_LEN));
        errors.into_result()?;
        match (bio, address, username) {
            (Some(bio), Some(address), Some(username)) => Ok(ProfileDraft {
                bio,
                address,
                username,
            }),
            _ => Err(FieldErrors::single("non_field_errors", "Invalid profile.")),
        }
    }

    pub fn into_patch(self) -> Result<ProfilePatch, FieldErrors> {
        let mut errors = FieldErrors::new();
        let patch = ProfilePatch {
            bio: errors.optional_text("bio", self.bio.as_deref(), None),
            address: errors.optional_text("address", self.address.as_deref(), Some(ADDRESS_MAX_LEN)),
            username: errors.optional_text(
                "username",
                self.username.as_deref(),
                Some(USERNAME_MAX_LEN),
            ),
        };
        errors.into_result()?;
        Ok(patch)
    }
}

pub(crate) fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(n) if !n.is_empty() => haystack.to_lowercase().contains(&n.to_lowercase()),
        _ => true,
    }
}
