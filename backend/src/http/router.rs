//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! static serving of uploaded media and creates the axum router ready for
//! serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers::{self, comments, posts, profiles, users};
use super::state::AppState;

/// Room for multipart framing on top of the largest accepted image.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Create the main application router with all routes and middleware.
///
/// `media_url_prefix` is where the media root is served, e.g. `/media`.
pub fn create_router(state: AppState, media_url_prefix: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let user_routes = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/logout", get(users::logout).post(users::logout))
        .route(
            "/me",
            get(users::me)
                .put(users::update_me)
                .patch(users::update_me)
                .delete(users::delete_me),
        )
        .route("/me/posts", get(users::my_posts))
        .route("/me/follow/{id}", post(users::follow))
        .route(
            "/me/unfollow/{id}",
            get(users::unfollow)
                .post(users::unfollow)
                .delete(users::unfollow),
        )
        .route("/me/followers", get(users::my_followers))
        .route("/me/following", get(users::my_following))
        .route("/me/following/posts", get(users::following_posts));

    let social_routes = Router::new()
        // Profiles
        .route(
            "/profiles",
            get(profiles::list_profiles).post(profiles::create_profile),
        )
        .route(
            "/profiles/{id}",
            get(profiles::get_profile)
                .put(profiles::replace_profile)
                .patch(profiles::patch_profile)
                .delete(profiles::delete_profile),
        )
        .route("/profiles/{id}/upload-image", post(profiles::upload_image))
        // Posts
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/liked", get(posts::liked_posts))
        .route(
            "/posts/{id}",
            get(posts::get_post)
                .put(posts::replace_post)
                .patch(posts::patch_post)
                .delete(posts::delete_post),
        )
        .route("/posts/{id}/upload-image", post(posts::upload_image))
        .route("/posts/{id}/like", post(posts::like))
        .route("/posts/{id}/unlike", post(posts::unlike))
        .route("/posts/{id}/comment", post(posts::comment))
        // Comments
        .route("/comments", get(comments::list_comments))
        .route(
            "/comments/{id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        );

    let body_limit = state.media.max_bytes() + BODY_LIMIT_SLACK;
    let media_files = ServeDir::new(state.media.root());

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/user", user_routes)
        .nest("/api/social_media", social_routes)
        .nest_service(media_url_prefix, media_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::services::MediaStore;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn crate::db::repository::FullRepository>;
        let state = AppState::new(repo, MediaStore::new("media", "/media", 1024));
        let _router = create_router(state, "/media");
    }
}
