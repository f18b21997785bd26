use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{auth_tokens, post_comments, post_likes, posts, profiles, user_followings, users};
use crate::models::{
    AuthToken, CommentId, FollowId, LikeId, Post, PostComment, PostId, PostLike, Profile,
    ProfileId, ProfilePatch, PostPatch, User, UserFollowing, UserId,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangeset<'a> {
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            email: row.email,
            password_hash: row.password_hash,
            is_staff: row.is_staff,
            date_joined: row.date_joined,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = auth_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuthTokenRow {
    pub digest: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<AuthTokenRow> for AuthToken {
    fn from(row: AuthTokenRow) -> Self {
        Self {
            digest: row.digest,
            user_id: UserId(row.user_id),
            created_at: row.created_at,
        }
    }
}

impl From<&AuthToken> for AuthTokenRow {
    fn from(token: &AuthToken) -> Self {
        Self {
            digest: token.digest.clone(),
            user_id: token.user_id.value(),
            created_at: token.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    pub id: i64,
    pub user_id: i64,
    pub bio: String,
    pub address: String,
    pub username: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfileRow<'a> {
    pub user_id: i64,
    pub bio: &'a str,
    pub address: &'a str,
    pub username: &'a str,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = profiles)]
pub struct ProfileChangeset<'a> {
    pub bio: Option<&'a str>,
    pub address: Option<&'a str>,
    pub username: Option<&'a str>,
}

impl<'a> From<&'a ProfilePatch> for ProfileChangeset<'a> {
    fn from(patch: &'a ProfilePatch) -> Self {
        Self {
            bio: patch.bio.as_deref(),
            address: patch.address.as_deref(),
            username: patch.username.as_deref(),
        }
    }
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: ProfileId(row.id),
            user_id: UserId(row.user_id),
            bio: row.bio,
            address: row.address,
            username: row.username,
            image: row.image,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPostRow<'a> {
    pub user_id: i64,
    pub title: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = posts)]
pub struct PostChangeset<'a> {
    pub title: Option<&'a str>,
    pub text: Option<&'a str>,
}

impl<'a> From<&'a PostPatch> for PostChangeset<'a> {
    fn from(patch: &'a PostPatch) -> Self {
        Self {
            title: patch.title.as_deref(),
            text: patch.text.as_deref(),
        }
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: PostId(row.id),
            user_id: UserId(row.user_id),
            title: row.title,
            text: row.text,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = post_likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostLikeRow {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = post_likes)]
pub struct NewPostLikeRow {
    pub user_id: i64,
    pub post_id: i64,
}

impl From<PostLikeRow> for PostLike {
    fn from(row: PostLikeRow) -> Self {
        Self {
            id: LikeId(row.id),
            user_id: UserId(row.user_id),
            post_id: PostId(row.post_id),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = post_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostCommentRow {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = post_comments)]
pub struct NewPostCommentRow<'a> {
    pub user_id: i64,
    pub post_id: i64,
    pub text: &'a str,
}

impl From<PostCommentRow> for PostComment {
    fn from(row: PostCommentRow) -> Self {
        Self {
            id: CommentId(row.id),
            user_id: UserId(row.user_id),
            post_id: PostId(row.post_id),
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_followings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserFollowingRow {
    pub id: i64,
    pub user_id: i64,
    pub following_user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_followings)]
pub struct NewUserFollowingRow {
    pub user_id: i64,
    pub following_user_id: i64,
}

impl From<UserFollowingRow> for UserFollowing {
    fn from(row: UserFollowingRow) -> Self {
        Self {
            id: FollowId(row.id),
            user_id: UserId(row.user_id),
            following_user_id: UserId(row.following_user_id),
            created_at: row.created_at,
        }
    }
}
