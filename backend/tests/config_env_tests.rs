//! Environment-driven configuration: repository selection and server settings.

mod support;

#[cfg(feature = "http-server")]
use std::path::PathBuf;
use std::str::FromStr;

use social_media::db::{RepositoryBuilder, RepositoryError, RepositoryFactory, RepositoryType};
#[cfg(feature = "http-server")]
use social_media::http::ServerConfig;

const REPO_VARS: [&str; 3] = ["REPOSITORY_TYPE", "DATABASE_URL", "PG_DATABASE_URL"];

fn cleared_repo_env() -> Vec<(&'static str, Option<&'static str>)> {
    REPO_VARS.iter().map(|k| (*k, None)).collect()
}

#[test]
fn test_repository_type_parsing_is_case_insensitive() {
    assert_eq!(RepositoryType::from_str("LOCAL").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("Postgres").unwrap(), RepositoryType::Postgres);
    let err = RepositoryType::from_str("sqlite").unwrap_err();
    assert!(err.contains("Unknown repository type"));
}

#[test]
fn test_repository_type_defaults_to_local_without_database() {
    support::with_scoped_env(&cleared_repo_env(), || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_database_url_selects_postgres() {
    let mut env = cleared_repo_env();
    env.push(("DATABASE_URL", Some("postgres://localhost/social")));
    support::with_scoped_env(&env, || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres);
    });
}

#[test]
fn test_explicit_repository_type_wins_over_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", Some("postgres://localhost/social")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_unknown_repository_type_falls_back_to_local() {
    let mut env = cleared_repo_env();
    env.push(("REPOSITORY_TYPE", Some("mongodb")));
    support::with_scoped_env(&env, || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[tokio::test]
async fn test_factory_builds_local_repository() {
    let repo = RepositoryFactory::create(RepositoryType::Local, None)
        .await
        .unwrap();
    assert!(repo.health_check().await.unwrap());

    let repo = RepositoryBuilder::new()
        .repository_type(RepositoryType::Local)
        .build()
        .await
        .unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[cfg(feature = "postgres-repo")]
#[tokio::test]
async fn test_postgres_without_config_is_a_configuration_error() {
    let result = RepositoryFactory::create(RepositoryType::Postgres, None).await;
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[cfg(not(feature = "postgres-repo"))]
#[tokio::test]
async fn test_postgres_without_feature_is_a_configuration_error() {
    let result = RepositoryFactory::create(RepositoryType::Postgres, None).await;
    match result {
        Err(err @ RepositoryError::ConfigurationError { .. }) => {
            assert!(err.to_string().contains("feature not enabled"));
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("postgres must not be available without the feature"),
    }
}

#[cfg(feature = "http-server")]
#[test]
fn test_server_config_defaults() {
    support::with_scoped_env(
        &[
            ("HOST", None),
            ("PORT", None),
            ("MEDIA_ROOT", None),
            ("MEDIA_URL_PREFIX", None),
            ("MAX_UPLOAD_BYTES", None),
        ],
        || {
            let config = ServerConfig::from_env();
            assert_eq!(config, ServerConfig::default());
            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 8080);
            assert_eq!(config.media_root, PathBuf::from("./media"));
            assert_eq!(config.media_url_prefix, "/media");
            assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        },
    );
}

#[cfg(feature = "http-server")]
#[test]
fn test_server_config_from_env() {
    support::with_scoped_env(
        &[
            ("HOST", Some("127.0.0.1")),
            ("PORT", Some("9000")),
            ("MEDIA_ROOT", Some("/var/lib/social/media")),
            ("MEDIA_URL_PREFIX", Some("uploads/")),
            ("MAX_UPLOAD_BYTES", Some("1024")),
        ],
        || {
            let config = ServerConfig::from_env();
            assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:9000");
            assert_eq!(config.media_root, PathBuf::from("/var/lib/social/media"));
            assert_eq!(config.media_url_prefix, "/uploads");
            assert_eq!(config.media_store().max_bytes(), 1024);
        },
    );
}

#[cfg(feature = "http-server")]
#[test]
fn test_server_config_ignores_bad_numbers() {
    support::with_scoped_env(
        &[("PORT", Some("not-a-port")), ("MAX_UPLOAD_BYTES", Some("-1"))],
        || {
            let config = ServerConfig::from_env();
            assert_eq!(config.port, 8080);
            assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        },
    );
}
