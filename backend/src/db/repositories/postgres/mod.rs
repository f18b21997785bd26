//! Postgres repository implementation using Diesel.
//!
//! The schema lives in `migrations/` and is embedded into the binary; cascades
//! on user and post deletion are enforced by foreign keys, while
//! `user_followings` carries plain integer columns.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    EngagementRepository, ErrorContext, FollowRepository, PostRepository, ProfileRepository,
    RepositoryError, RepositoryResult, UserRepository,
};
use crate::models::*;

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
    /// - `PG_POOL_MAX`: Maximum pool size (default: 10)
    /// - `PG_POOL_MIN`: Minimum pool size (default: 1)
    /// - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
    /// - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
    /// - `PG_MAX_RETRIES`: Maximum retry attempts (default: 3)
    /// - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let max_retries = std::env::var("PG_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("PG_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
///
/// Runs pending migrations on construction and retries transient failures
/// with exponential backoff.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: std::sync::Arc<AtomicU64>,
    failed_queries: std::sync::Arc<AtomicU64>,
    retried_operations: std::sync::Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Arguments
    /// * `config` - Database configuration
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: std::sync::Arc::new(AtomicU64::new(0)),
            failed_queries: std::sync::Arc::new(AtomicU64::new(0)),
            retried_operations: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// This method will retry the operation up to `max_retries` times if a
    /// retryable error occurs (connection errors, timeouts, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                // Get connection
                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                // Execute the operation
                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    ///
    /// Returns current pool state and query statistics for monitoring.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn missing(entity: &str, operation: &str, id: impl ToString) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("{} not found", entity),
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id),
    )
}

/// Turn a user-supplied fragment into an `ILIKE` pattern matching it anywhere.
fn contains_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn raw_ids<T: Copy + Into<i64>>(ids: &[T]) -> Vec<i64> {
    ids.iter().map(|id| (*id).into()).collect()
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let user = user.clone();
        self.with_conn(move |conn| {
            diesel::insert_into(users::table)
                .values(&NewUserRow {
                    email: &user.email,
                    password_hash: &user.password_hash,
                })
                .returning(UserRow::as_returning())
                .get_result(conn)
                .map(User::from)
                .map_err(|e| map_diesel_error(e).with_operation("create_user"))
        })
        .await
    }

    async fn get_user(&self, user_id: UserId) -> RepositoryResult<User> {
        self.with_conn(move |conn| {
            users::table
                .find(user_id.value())
                .select(UserRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(User::from)
                .ok_or_else(|| missing("user", "get_user", user_id))
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            users::table
                .filter(users::email.eq(&email))
                .select(UserRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(User::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_user(&self, user_id: UserId, changes: &UserChanges) -> RepositoryResult<User> {
        if changes.is_empty() {
            return self.get_user(user_id).await;
        }
        let changes = changes.clone();
        self.with_conn(move |conn| {
            diesel::update(users::table.find(user_id.value()))
                .set(&UserChangeset {
                    email: changes.email.as_deref(),
                    password_hash: changes.password_hash.as_deref(),
                })
                .returning(UserRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(|e| map_diesel_error(e).with_operation("update_user"))?
                .map(User::from)
                .ok_or_else(|| missing("user", "update_user", user_id))
        })
        .await
    }

    async fn delete_user(&self, user_id: UserId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(users::table.find(user_id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(missing("user", "delete_user", user_id));
            }
            Ok(())
        })
        .await
    }

    async fn store_token(&self, token: &AuthToken) -> RepositoryResult<()> {
        let row = AuthTokenRow::from(token);
        self.with_conn(move |conn| {
            diesel::insert_into(auth_tokens::table)
                .values(&row)
                .execute(conn)
                .map(|_| ())
                .map_err(|e| map_diesel_error(e).with_operation("store_token"))
        })
        .await
    }

    async fn find_token(&self, digest: &str) -> RepositoryResult<Option<AuthToken>> {
        let digest = digest.to_string();
        self.with_conn(move |conn| {
            auth_tokens::table
                .find(&digest)
                .select(AuthTokenRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(AuthToken::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn delete_token(&self, digest: &str) -> RepositoryResult<bool> {
        let digest = digest.to_string();
        self.with_conn(move |conn| {
            diesel::delete(auth_tokens::table.find(&digest))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl ProfileRepository for PostgresRepository {
    async fn create_profile(
        &self,
        owner: UserId,
        draft: &ProfileDraft,
    ) -> RepositoryResult<Profile> {
        let draft = draft.clone();
        self.with_conn(move |conn| {
            diesel::insert_into(profiles::table)
                .values(&NewProfileRow {
                    user_id: owner.value(),
                    bio: &draft.bio,
                    address: &draft.address,
                    username: &draft.username,
                })
                .returning(ProfileRow::as_returning())
                .get_result(conn)
                .map(Profile::from)
                .map_err(|e| map_diesel_error(e).with_operation("create_profile"))
        })
        .await
    }

    async fn get_profile(&self, profile_id: ProfileId) -> RepositoryResult<Profile> {
        self.with_conn(move |conn| {
            profiles::table
                .find(profile_id.value())
                .select(ProfileRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Profile::from)
                .ok_or_else(|| missing("profile", "get_profile", profile_id))
        })
        .await
    }

    async fn list_profiles(&self, filter: &ProfileFilter) -> RepositoryResult<Vec<Profile>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut query = profiles::table.into_boxed();
            if let Some(bio) = non_empty(&filter.bio) {
                query = query.filter(profiles::bio.ilike(contains_pattern(bio)));
            }
            if let Some(address) = non_empty(&filter.address) {
                query = query.filter(profiles::address.ilike(contains_pattern(address)));
            }
            if let Some(username) = non_empty(&filter.username) {
                query = query.filter(profiles::username.ilike(contains_pattern(username)));
            }
            query
                .order(profiles::id.asc())
                .select(ProfileRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Profile::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn profiles_for_users(&self, user_ids: &[UserId]) -> RepositoryResult<Vec<Profile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = raw_ids(user_ids);
        self.with_conn(move |conn| {
            profiles::table
                .filter(profiles::user_id.eq_any(&ids))
                .order(profiles::id.asc())
                .select(ProfileRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Profile::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_profile(
        &self,
        profile_id: ProfileId,
        patch: &ProfilePatch,
    ) -> RepositoryResult<Profile> {
        if patch.is_empty() {
            return self.get_profile(profile_id).await;
        }
        let patch = patch.clone();
        self.with_conn(move |conn| {
            diesel::update(profiles::table.find(profile_id.value()))
                .set(&ProfileChangeset::from(&patch))
                .returning(ProfileRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Profile::from)
                .ok_or_else(|| missing("profile", "update_profile", profile_id))
        })
        .await
    }

    async fn set_profile_image(
        &self,
        profile_id: ProfileId,
        image: Option<&str>,
    ) -> RepositoryResult<Profile> {
        let image = image.map(str::to_string);
        self.with_conn(move |conn| {
            diesel::update(profiles::table.find(profile_id.value()))
                .set(profiles::image.eq(&image))
                .returning(ProfileRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Profile::from)
                .ok_or_else(|| missing("profile", "set_profile_image", profile_id))
        })
        .await
    }

    async fn delete_profile(&self, profile_id: ProfileId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(profiles::table.find(profile_id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(missing("profile", "delete_profile", profile_id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl PostRepository for PostgresRepository {
    async fn create_post(&self, author: UserId, draft: &PostDraft) -> RepositoryResult<Post> {
        let draft = draft.clone();
        self.with_conn(move |conn| {
            diesel::insert_into(posts::table)
                .values(&NewPostRow {
                    user_id: author.value(),
                    title: &draft.title,
                    text: &draft.text,
                })
                .returning(PostRow::as_returning())
                .get_result(conn)
                .map(Post::from)
                .map_err(|e| map_diesel_error(e).with_operation("create_post"))
        })
        .await
    }

    async fn get_post(&self, post_id: PostId) -> RepositoryResult<Post> {
        self.with_conn(move |conn| {
            posts::table
                .find(post_id.value())
                .select(PostRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Post::from)
                .ok_or_else(|| missing("post", "get_post", post_id))
        })
        .await
    }

    async fn list_posts(&self, filter: &PostFilter) -> RepositoryResult<Vec<Post>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut query = posts::table.into_boxed();
            if let Some(title) = non_empty(&filter.title) {
                query = query.filter(posts::title.ilike(contains_pattern(title)));
            }
            if let Some(text) = non_empty(&filter.text) {
                query = query.filter(posts::text.ilike(contains_pattern(text)));
            }
            query
                .order(posts::id.asc())
                .select(PostRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Post::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn posts_by_users(&self, user_ids: &[UserId]) -> RepositoryResult<Vec<Post>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = raw_ids(user_ids);
        self.with_conn(move |conn| {
            posts::table
                .filter(posts::user_id.eq_any(&ids))
                .order(posts::id.asc())
                .select(PostRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Post::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn posts_by_ids(&self, post_ids: &[PostId]) -> RepositoryResult<Vec<Post>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = raw_ids(post_ids);
        self.with_conn(move |conn| {
            posts::table
                .filter(posts::id.eq_any(&ids))
                .order(posts::id.asc())
                .select(PostRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Post::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_post(&self, post_id: PostId, patch: &PostPatch) -> RepositoryResult<Post> {
        if patch.is_empty() {
            return self.get_post(post_id).await;
        }
        let patch = patch.clone();
        self.with_conn(move |conn| {
            diesel::update(posts::table.find(post_id.value()))
                .set(&PostChangeset::from(&patch))
                .returning(PostRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Post::from)
                .ok_or_else(|| missing("post", "update_post", post_id))
        })
        .await
    }

    async fn set_post_image(
        &self,
        post_id: PostId,
        image: Option<&str>,
    ) -> RepositoryResult<Post> {
        let image = image.map(str::to_string);
        self.with_conn(move |conn| {
            diesel::update(posts::table.find(post_id.value()))
                .set(posts::image.eq(&image))
                .returning(PostRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Post::from)
                .ok_or_else(|| missing("post", "set_post_image", post_id))
        })
        .await
    }

    async fn delete_post(&self, post_id: PostId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(posts::table.find(post_id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(missing("post", "delete_post", post_id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl EngagementRepository for PostgresRepository {
    async fn likes_for_post(&self, post_id: PostId) -> RepositoryResult<Vec<PostLike>> {
        self.with_conn(move |conn| {
            post_likes::table
                .filter(post_likes::post_id.eq(post_id.value()))
                .order(post_likes::id.asc())
                .select(PostLikeRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(PostLike::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn replace_like(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<PostLike> {
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let exists = posts::table
                    .find(post_id.value())
                    .select(posts::id)
                    .first::<i64>(tx)
                    .optional()
                    .map_err(map_diesel_error)?
                    .is_some();
                if !exists {
                    return Err(missing("post", "replace_like", post_id));
                }

                diesel::delete(
                    post_likes::table
                        .filter(post_likes::user_id.eq(user_id.value()))
                        .filter(post_likes::post_id.eq(post_id.value())),
                )
                .execute(tx)
                .map_err(map_diesel_error)?;

                diesel::insert_into(post_likes::table)
                    .values(&NewPostLikeRow {
                        user_id: user_id.value(),
                        post_id: post_id.value(),
                    })
                    .returning(PostLikeRow::as_returning())
                    .get_result(tx)
                    .map(PostLike::from)
                    .map_err(map_diesel_error)
            })
        })
        .await
    }

    async fn delete_likes(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<usize> {
        self.with_conn(move |conn| {
            diesel::delete(
                post_likes::table
                    .filter(post_likes::user_id.eq(user_id.value()))
                    .filter(post_likes::post_id.eq(post_id.value())),
            )
            .execute(conn)
            .map_err(map_diesel_error)
        })
        .await
    }

    async fn liked_post_ids(&self, user_id: UserId) -> RepositoryResult<Vec<PostId>> {
        self.with_conn(move |conn| {
            post_likes::table
                .filter(post_likes::user_id.eq(user_id.value()))
                .select(post_likes::post_id)
                .distinct()
                .order(post_likes::post_id.asc())
                .load::<i64>(conn)
                .map(|ids| ids.into_iter().map(PostId).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_comment(
        &self,
        user_id: UserId,
        post_id: PostId,
        text: &str,
    ) -> RepositoryResult<PostComment> {
        let text = text.to_string();
        self.with_conn(move |conn| {
            let exists = posts::table
                .find(post_id.value())
                .select(posts::id)
                .first::<i64>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .is_some();
            if !exists {
                return Err(missing("post", "create_comment", post_id));
            }
            diesel::insert_into(post_comments::table)
                .values(&NewPostCommentRow {
                    user_id: user_id.value(),
                    post_id: post_id.value(),
                    text: &text,
                })
                .returning(PostCommentRow::as_returning())
                .get_result(conn)
                .map(PostComment::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_comment(&self, comment_id: CommentId) -> RepositoryResult<PostComment> {
        self.with_conn(move |conn| {
            post_comments::table
                .find(comment_id.value())
                .select(PostCommentRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(PostComment::from)
                .ok_or_else(|| missing("comment", "get_comment", comment_id))
        })
        .await
    }

    async fn list_comments(&self, post_id: Option<PostId>) -> RepositoryResult<Vec<PostComment>> {
        self.with_conn(move |conn| {
            let mut query = post_comments::table.into_boxed();
            if let Some(post_id) = post_id {
                query = query.filter(post_comments::post_id.eq(post_id.value()));
            }
            query
                .order(post_comments::id.asc())
                .select(PostCommentRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(PostComment::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_comment(
        &self,
        comment_id: CommentId,
        text: &str,
    ) -> RepositoryResult<PostComment> {
        let text = text.to_string();
        self.with_conn(move |conn| {
            diesel::update(post_comments::table.find(comment_id.value()))
                .set(post_comments::text.eq(&text))
                .returning(PostCommentRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(PostComment::from)
                .ok_or_else(|| missing("comment", "update_comment", comment_id))
        })
        .await
    }

    async fn delete_comment(&self, comment_id: CommentId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(post_comments::table.find(comment_id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(missing("comment", "delete_comment", comment_id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl FollowRepository for PostgresRepository {
    async fn find_following(
        &self,
        user_id: UserId,
        follower: UserId,
    ) -> RepositoryResult<Option<UserFollowing>> {
        self.with_conn(move |conn| {
            user_followings::table
                .filter(user_followings::user_id.eq(user_id.value()))
                .filter(user_followings::following_user_id.eq(follower.value()))
                .order(user_followings::id.asc())
                .select(UserFollowingRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(UserFollowing::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_following(
        &self,
        user_id: UserId,
        follower: UserId,
    ) -> RepositoryResult<UserFollowing> {
        self.with_conn(move |conn| {
            diesel::insert_into(user_followings::table)
                .values(&NewUserFollowingRow {
                    user_id: user_id.value(),
                    following_user_id: follower.value(),
                })
                .returning(UserFollowingRow::as_returning())
                .get_result(conn)
                .map(UserFollowing::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn delete_following(&self, user_id: UserId, follower: UserId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(
                user_followings::table
                    .filter(user_followings::user_id.eq(user_id.value()))
                    .filter(user_followings::following_user_id.eq(follower.value())),
            )
            .execute(conn)
            .map(|n| n > 0)
            .map_err(map_diesel_error)
        })
        .await
    }

    async fn followed_by(&self, follower: UserId) -> RepositoryResult<Vec<UserId>> {
        self.with_conn(move |conn| {
            user_followings::table
                .filter(user_followings::following_user_id.eq(follower.value()))
                .order(user_followings::id.asc())
                .select(user_followings::user_id)
                .load::<i64>(conn)
                .map(|ids| ids.into_iter().map(UserId).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn followers_of(&self, user_id: UserId) -> RepositoryResult<Vec<UserId>> {
        self.with_conn(move |conn| {
            user_followings::table
                .filter(user_followings::user_id.eq(user_id.value()))
                .order(user_followings::id.asc())
                .select(user_followings::following_user_id)
                .load::<i64>(conn)
                .map(|ids| ids.into_iter().map(UserId).collect())
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("war"), "%war%");
        assert_eq!(contains_pattern("100%_done"), "%100\\%\\_done%");
    }

    #[test]
    fn test_config_with_url_keeps_defaults() {
        let config = PostgresConfig::with_url("postgres://localhost/social");
        assert_eq!(config.database_url, "postgres://localhost/social");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.max_retries, 3);
    }
}
