//! In-memory local repository implementation.
//!
//! Stores every table in ordered maps behind a single lock, which makes runs
//! deterministic and isolated. Used for unit tests and local development.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::*;

/// In-memory local repository.
///
/// # Example
/// ```
/// use social_media::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.post_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    users: BTreeMap<UserId, User>,
    tokens: BTreeMap<String, AuthToken>,
    profiles: BTreeMap<ProfileId, Profile>,
    posts: BTreeMap<PostId, Post>,
    likes: BTreeMap<LikeId, PostLike>,
    comments: BTreeMap<CommentId, PostComment>,
    followings: BTreeMap<FollowId, UserFollowing>,

    // ID counters
    next_user_id: i64,
    next_profile_id: i64,
    next_post_id: i64,
    next_like_id: i64,
    next_comment_id: i64,
    next_follow_id: i64,

    // Connection health
    is_healthy: bool,
    read_only: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            tokens: BTreeMap::new(),
            profiles: BTreeMap::new(),
            posts: BTreeMap::new(),
            likes: BTreeMap::new(),
            comments: BTreeMap::new(),
            followings: BTreeMap::new(),
            next_user_id: 1,
            next_profile_id: 1,
            next_post_id: 1,
            next_like_id: 1,
            next_comment_id: 1,
            next_follow_id: 1,
            is_healthy: true,
            read_only: false,
        }
    }
}

fn take_id(counter: &mut i64) -> i64 {
    let id = *counter;
    *counter += 1;
    id
}

fn missing(entity: &str, operation: &str, id: impl ToString) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("{} not found", entity),
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id),
    )
}

impl LocalData {
    fn remove_post_cascade(&mut self, post_id: PostId) {
        self.posts.remove(&post_id);
        self.likes.retain(|_, like| like.post_id != post_id);
        self.comments.retain(|_, comment| comment.post_id != post_id);
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Reject every write while reads keep working, like a demoted primary.
    pub fn set_read_only(&self, read_only: bool) {
        self.data.write().read_only = read_only;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            read_only: data.read_only,
            ..Default::default()
        };
    }

    pub fn user_count(&self) -> usize {
        self.data.read().users.len()
    }

    pub fn post_count(&self) -> usize {
        self.data.read().posts.len()
    }

    pub fn like_count(&self) -> usize {
        self.data.read().likes.len()
    }

    pub fn comment_count(&self) -> usize {
        self.data.read().comments.len()
    }

    pub fn following_count(&self) -> usize {
        self.data.read().followings.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }

    fn check_writable(&self) -> RepositoryResult<()> {
        self.check_health()?;
        if self.data.read().read_only {
            return Err(RepositoryError::connection("Database is read-only"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        self.check_writable()?;
        let mut data = self.data.write();
        if data.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::conflict_with_context(
                "A user with that email already exists",
                ErrorContext::new("create_user").with_entity("user"),
            ));
        }
        let id = UserId::new(take_id(&mut data.next_user_id));
        let stored = User {
            id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            is_staff: false,
            date_joined: Utc::now(),
        };
        data.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_user(&self, user_id: UserId) -> RepositoryResult<User> {
        self.check_health()?;
        self.data
            .read()
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| missing("user", "get_user", user_id))
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user(&self, user_id: UserId, changes: &UserChanges) -> RepositoryResult<User> {
        self.check_writable()?;
        let mut data = self.data.write();
        if let Some(email) = &changes.email {
            if data
                .users
                .values()
                .any(|u| u.id != user_id && &u.email == email)
            {
                return Err(RepositoryError::conflict_with_context(
                    "A user with that email already exists",
                    ErrorContext::new("update_user")
                        .with_entity("user")
                        .with_entity_id(user_id),
                ));
            }
        }
        let user = data
            .users
            .get_mut(&user_id)
            .ok_or_else(|| missing("user", "update_user", user_id))?;
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(hash) = &changes.password_hash {
            user.password_hash = hash.clone();
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: UserId) -> RepositoryResult<()> {
        self.check_writable()?;
        let mut data = self.data.write();
        if data.users.remove(&user_id).is_none() {
            return Err(missing("user", "delete_user", user_id));
        }
        data.tokens.retain(|_, t| t.user_id != user_id);
        data.profiles.retain(|_, p| p.user_id != user_id);
        let owned_posts: Vec<PostId> = data
            .posts
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.id)
            .collect();
        for post_id in owned_posts {
            data.remove_post_cascade(post_id);
        }
        data.likes.retain(|_, l| l.user_id != user_id);
        data.comments.retain(|_, c| c.user_id != user_id);
        Ok(())
    }

    async fn store_token(&self, token: &AuthToken) -> RepositoryResult<()> {
        self.check_writable()?;
        let mut data = self.data.write();
        if !data.users.contains_key(&token.user_id) {
            return Err(missing("user", "store_token", token.user_id));
        }
        data.tokens.insert(token.digest.clone(), token.clone());
        Ok(())
    }

    async fn find_token(&self, digest: &str) -> RepositoryResult<Option<AuthToken>> {
        self.check_health()?;
        Ok(self.data.read().tokens.get(digest).cloned())
    }

    async fn delete_token(&self, digest: &str) -> RepositoryResult<bool> {
        self.check_writable()?;
        Ok(self.data.write().tokens.remove(digest).is_some())
    }
}

#[async_trait]
impl ProfileRepository for LocalRepository {
    async fn create_profile(
        &self,
        owner: UserId,
        draft: &ProfileDraft,
    ) -> RepositoryResult<Profile> {
        self.check_writable()?;
        let mut data = self.data.write();
        if !data.users.contains_key(&owner) {
            return Err(missing("user", "create_profile", owner));
        }
        let id = ProfileId::new(take_id(&mut data.next_profile_id));
        let profile = Profile {
            id,
            user_id: owner,
            bio: draft.bio.clone(),
            address: draft.address.clone(),
            username: draft.username.clone(),
            image: None,
        };
        data.profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, profile_id: ProfileId) -> RepositoryResult<Profile> {
        self.check_health()?;
        self.data
            .read()
            .profiles
            .get(&profile_id)
            .cloned()
            .ok_or_else(|| missing("profile", "get_profile", profile_id))
    }

    async fn list_profiles(&self, filter: &ProfileFilter) -> RepositoryResult<Vec<Profile>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .profiles
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn profiles_for_users(&self, user_ids: &[UserId]) -> RepositoryResult<Vec<Profile>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .profiles
            .values()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn update_profile(
        &self,
        profile_id: ProfileId,
        patch: &ProfilePatch,
    ) -> RepositoryResult<Profile> {
        self.check_writable()?;
        let mut data = self.data.write();
        let profile = data
            .profiles
            .get_mut(&profile_id)
            .ok_or_else(|| missing("profile", "update_profile", profile_id))?;
        if let Some(bio) = &patch.bio {
            profile.bio = bio.clone();
        }
        if let Some(address) = &patch.address {
            profile.address = address.clone();
        }
        if let Some(username) = &patch.username {
            profile.username = username.clone();
        }
        Ok(profile.clone())
    }

    async fn set_profile_image(
        &self,
        profile_id: ProfileId,
        image: Option<&str>,
    ) -> RepositoryResult<Profile> {
        self.check_writable()?;
        let mut data = self.data.write();
        let profile = data
            .profiles
            .get_mut(&profile_id)
            .ok_or_else(|| missing("profile", "set_profile_image", profile_id))?;
        profile.image = image.map(str::to_string);
        Ok(profile.clone())
    }

    async fn delete_profile(&self, profile_id: ProfileId) -> RepositoryResult<()> {
        self.check_writable()?;
        self.data
            .write()
            .profiles
            .remove(&profile_id)
            .map(|_| ())
            .ok_or_else(|| missing("profile", "delete_profile", profile_id))
    }
}

#[async_trait]
impl PostRepository for LocalRepository {
    async fn create_post(&self, author: UserId, draft: &PostDraft) -> RepositoryResult<Post> {
        self.check_writable()?;
        let mut data = self.data.write();
        if !data.users.contains_key(&author) {
            return Err(missing("user", "create_post", author));
        }
        let id = PostId::new(take_id(&mut data.next_post_id));
        let post = Post {
            id,
            user_id: author,
            title: draft.title.clone(),
            text: draft.text.clone(),
            image: None,
            created_at: Utc::now(),
        };
        data.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, post_id: PostId) -> RepositoryResult<Post> {
        self.check_health()?;
        self.data
            .read()
            .posts
            .get(&post_id)
            .cloned()
            .ok_or_else(|| missing("post", "get_post", post_id))
    }

    async fn list_posts(&self, filter: &PostFilter) -> RepositoryResult<Vec<Post>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .posts
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn posts_by_users(&self, user_ids: &[UserId]) -> RepositoryResult<Vec<Post>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .posts
            .values()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn posts_by_ids(&self, post_ids: &[PostId]) -> RepositoryResult<Vec<Post>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .posts
            .values()
            .filter(|p| post_ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn update_post(&self, post_id: PostId, patch: &PostPatch) -> RepositoryResult<Post> {
        self.check_writable()?;
        let mut data = self.data.write();
        let post = data
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| missing("post", "update_post", post_id))?;
        if let Some(title) = &patch.title {
            post.title = title.clone();
        }
        if let Some(text) = &patch.text {
            post.text = text.clone();
        }
        Ok(post.clone())
    }

    async fn set_post_image(
        &self,
        post_id: PostId,
        image: Option<&str>,
    ) -> RepositoryResult<Post> {
        self.check_writable()?;
        let mut data = self.data.write();
        let post = data
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| missing("post", "set_post_image", post_id))?;
        post.image = image.map(str::to_string);
        Ok(post.clone())
    }

    async fn delete_post(&self, post_id: PostId) -> RepositoryResult<()> {
        self.check_writable()?;
        let mut data = self.data.write();
        if !data.posts.contains_key(&post_id) {
            return Err(missing("post", "delete_post", post_id));
        }
        data.remove_post_cascade(post_id);
        Ok(())
    }
}

#[async_trait]
impl EngagementRepository for LocalRepository {
    async fn likes_for_post(&self, post_id: PostId) -> RepositoryResult<Vec<PostLike>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .likes
            .values()
            .filter(|l| l.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn replace_like(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<PostLike> {
        self.check_writable()?;
        let mut data = self.data.write();
        if !data.posts.contains_key(&post_id) {
            return Err(missing("post", "replace_like", post_id));
        }
        data.likes
            .retain(|_, l| !(l.user_id == user_id && l.post_id == post_id));
        let id = LikeId::new(take_id(&mut data.next_like_id));
        let like = PostLike {
            id,
            user_id,
            post_id,
            created_at: Utc::now(),
        };
        data.likes.insert(id, like.clone());
        Ok(like)
    }

    async fn delete_likes(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<usize> {
        self.check_writable()?;
        let mut data = self.data.write();
        let before = data.likes.len();
        data.likes
            .retain(|_, l| !(l.user_id == user_id && l.post_id == post_id));
        Ok(before - data.likes.len())
    }

    async fn liked_post_ids(&self, user_id: UserId) -> RepositoryResult<Vec<PostId>> {
        self.check_health()?;
        let mut ids: Vec<PostId> = self
            .data
            .read()
            .likes
            .values()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.post_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn create_comment(
        &self,
        user_id: UserId,
        post_id: PostId,
        text: &str,
    ) -> RepositoryResult<PostComment> {
        self.check_writable()?;
        let mut data = self.data.write();
        if !data.posts.contains_key(&post_id) {
            return Err(missing("post", "create_comment", post_id));
        }
        let id = CommentId::new(take_id(&mut data.next_comment_id));
        let comment = PostComment {
            id,
            user_id,
            post_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        data.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, comment_id: CommentId) -> RepositoryResult<PostComment> {
        self.check_health()?;
        self.data
            .read()
            .comments
            .get(&comment_id)
            .cloned()
            .ok_or_else(|| missing("comment", "get_comment", comment_id))
    }

    async fn list_comments(&self, post_id: Option<PostId>) -> RepositoryResult<Vec<PostComment>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .comments
            .values()
            .filter(|c| post_id.map_or(true, |p| c.post_id == p))
            .cloned()
            .collect())
    }

    async fn update_comment(
        &self,
        comment_id: CommentId,
        text: &str,
    ) -> RepositoryResult<PostComment> {
        self.check_writable()?;
        let mut data = self.data.write();
        let comment = data
            .comments
            .get_mut(&comment_id)
            .ok_or_else(|| missing("comment", "update_comment", comment_id))?;
        comment.text = text.to_string();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, comment_id: CommentId) -> RepositoryResult<()> {
        self.check_writable()?;
        self.data
            .write()
            .comments
            .remove(&comment_id)
            .map(|_| ())
            .ok_or_else(|| missing("comment", "delete_comment", comment_id))
    }
}

#[async_trait]
impl FollowRepository for LocalRepository {
    async fn find_following(
        &self,
        user_id: UserId,
        follower: UserId,
    ) -> RepositoryResult<Option<UserFollowing>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .followings
            .values()
            .find(|f| f.user_id == user_id && f.following_user_id == follower)
            .cloned())
    }

    async fn create_following(
        &self,
        user_id: UserId,
        follower: UserId,
    ) -> RepositoryResult<UserFollowing> {
        self.check_writable()?;
        let mut data = self.data.write();
        let id = FollowId::new(take_id(&mut data.next_follow_id));
        let edge = UserFollowing {
            id,
            user_id,
            following_user_id: follower,
            created_at: Utc::now(),
        };
        data.followings.insert(id, edge.clone());
        Ok(edge)
    }

    async fn delete_following(&self, user_id: UserId, follower: UserId) -> RepositoryResult<bool> {
        self.check_writable()?;
        let mut data = self.data.write();
        let before = data.followings.len();
        data.followings
            .retain(|_, f| !(f.user_id == user_id && f.following_user_id == follower));
        Ok(data.followings.len() < before)
    }

    async fn followed_by(&self, follower: UserId) -> RepositoryResult<Vec<UserId>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .followings
            .values()
            .filter(|f| f.following_user_id == follower)
            .map(|f| f.user_id)
            .collect())
    }

    async fn followers_of(&self, user_id: UserId) -> RepositoryResult<Vec<UserId>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .followings
            .values()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.following_user_id)
            .collect())
    }
}
