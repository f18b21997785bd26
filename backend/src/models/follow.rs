//! Follow edges between users.

use chrono::{DateTime, Utc};

use super::user::UserId;
use crate::define_id_type;

define_id_type!(i64, FollowId);

/// One follow edge.
///
/// The row `(user_id = A, following_user_id = B)` reads "B follows A". The two
/// columns are plain integers in storage: no foreign keys, so edges outlive the
/// users they mention until someone unfollows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFollowing {
    pub id: FollowId,
    /// The user being followed.
    pub user_id: UserId,
    /// The follower.
    pub following_user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl UserFollowing {
    pub fn follower(&self) -> UserId {
        self.following_user_id
    }

    pub fn followed(&self) -> UserId {
        self.user_id
    }
}
