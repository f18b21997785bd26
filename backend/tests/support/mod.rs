//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use social_media::db::{LocalRepository, UserRepository};
use social_media::models::{AuthToken, NewUser, User};
use social_media::services::auth::token_digest;
use uuid::Uuid;

#[cfg(feature = "http-server")]
pub mod http;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Create an account directly in the repository and issue it a token.
///
/// Skips password hashing, so the account cannot log in with a password.
pub async fn seed_user(repo: &LocalRepository, email: &str) -> (User, String) {
    let user = repo
        .create_user(&NewUser {
            email: email.to_string(),
            password_hash: "!".to_string(),
        })
        .await
        .expect("seed user");
    let token = Uuid::new_v4().to_string();
    repo.store_token(&AuthToken {
        digest: token_digest(&token),
        user_id: user.id,
        created_at: Utc::now(),
    })
    .await
    .expect("seed token");
    (user, token)
}

pub fn local_repo() -> Arc<LocalRepository> {
    Arc::new(LocalRepository::new())
}

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
