//! # Social Media Backend
//!
//! A REST backend for a small social network: accounts with token auth,
//! profiles, posts with images, likes, comments and a follow graph.
//!
//! ## Features
//!
//! - **Accounts**: email/password registration, argon2 hashing, bearer tokens
//! - **Content**: profiles, posts, comments and likes with owner-only writes
//! - **Social graph**: follow/unfollow, followers, following and their posts
//! - **Media**: validated image uploads served under a public prefix
//! - **Delayed posts**: create a post after a countdown on a background task
//! - **HTTP API**: axum router behind the `http-server` feature
//!
//! ## Architecture
//!
//! - [`models`]: domain records, ids and input validation
//! - [`db`]: repository traits with in-memory and Postgres backends
//! - [`services`]: business operations over any repository
//! - [`api`]: JSON representations returned to clients
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
