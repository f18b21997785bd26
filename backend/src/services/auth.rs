//! Accounts, passwords and bearer tokens.
//!
//! Passwords are stored as Argon2 PHC strings. Login issues a random UUIDv4
//! token; only its SHA-256 digest reaches the repository, so a leaked table
//! cannot be replayed.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use log::{debug, info};
use rand::rngs::OsRng;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::db::checksum::sha256_hex;
use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::validation::NON_FIELD_ERRORS;
use crate::models::{AuthToken, CredentialsInput, NewUser, User, UserChanges, UserId};

const DUPLICATE_EMAIL: &str = "user with this email already exists.";
const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Digest under which a token is stored and looked up.
pub fn token_digest(token: &str) -> String {
    sha256_hex(token)
}

/// Argon2 is deliberately slow; keep it off the async workers.
async fn hash_off_runtime(password: String) -> ServiceResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServiceError::Internal(format!("Task join error: {}", e)))?
}

async fn verify_off_runtime(password: String, hash: String) -> ServiceResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ServiceError::Internal(format!("Task join error: {}", e)))
}

fn map_email_conflict(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::Conflict { .. } => ServiceError::invalid("email", DUPLICATE_EMAIL),
        other => other.into(),
    }
}

/// Create an account. The email is normalized to lowercase.
pub async fn register<R: FullRepository + ?Sized>(
    repo: &R,
    input: CredentialsInput,
) -> ServiceResult<User> {
    let creds = input.into_registration()?;
    if repo.find_user_by_email(&creds.email).await?.is_some() {
        return Err(ServiceError::invalid("email", DUPLICATE_EMAIL));
    }

    let password_hash = hash_off_runtime(creds.password).await?;
    let user = repo
        .create_user(&NewUser {
            email: creds.email,
            password_hash,
        })
        .await
        .map_err(map_email_conflict)?;

    info!("Registered user {}", user.id);
    Ok(user)
}

/// Check credentials and issue a new bearer token.
pub async fn login<R: FullRepository + ?Sized>(
    repo: &R,
    input: CredentialsInput,
) -> ServiceResult<String> {
    let creds = input.into_login()?;
    let user = match repo.find_user_by_email(&creds.email).await? {
        Some(user) => user,
        None => return Err(ServiceError::invalid(NON_FIELD_ERRORS, BAD_CREDENTIALS)),
    };

    if !verify_off_runtime(creds.password, user.password_hash.clone()).await? {
        return Err(ServiceError::invalid(NON_FIELD_ERRORS, BAD_CREDENTIALS));
    }

    let token = Uuid::new_v4().to_string();
    repo.store_token(&AuthToken {
        digest: token_digest(&token),
        user_id: user.id,
        created_at: Utc::now(),
    })
    .await?;

    debug!("Issued token for user {}", user.id);
    Ok(token)
}

/// Resolve a presented bearer token to its user.
pub async fn authenticate<R: FullRepository + ?Sized>(repo: &R, token: &str) -> ServiceResult<User> {
    let stored = repo
        .find_token(&token_digest(token))
        .await?
        .ok_or(ServiceError::Unauthenticated)?;

    match repo.get_user(stored.user_id).await {
        Ok(user) => Ok(user),
        Err(RepositoryError::NotFound { .. }) => Err(ServiceError::Unauthenticated),
        Err(e) => Err(e.into()),
    }
}

/// Revoke the presented token. Other sessions of the same user stay valid.
pub async fn logout<R: FullRepository + ?Sized>(repo: &R, token: &str) -> ServiceResult<()> {
    if !repo.delete_token(&token_digest(token)).await? {
        return Err(ServiceError::Unauthenticated);
    }
    Ok(())
}

/// Change email and/or password. A new password is re-hashed.
pub async fn update_account<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    input: CredentialsInput,
) -> ServiceResult<User> {
    let (email, password) = input.into_update()?;

    if let Some(email) = &email {
        if let Some(existing) = repo.find_user_by_email(email).await? {
            if existing.id != user.id {
                return Err(ServiceError::invalid("email", DUPLICATE_EMAIL));
            }
        }
    }

    let password_hash = match password {
        Some(password) => Some(hash_off_runtime(password).await?),
        None => None,
    };

    repo.update_user(
        user.id,
        &UserChanges {
            email,
            password_hash,
        },
    )
    .await
    .map_err(map_email_conflict)
}

/// Delete the account and everything it owns.
pub async fn delete_account<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
) -> ServiceResult<()> {
    repo.delete_user(user_id).await?;
    info!("Deleted user {}", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_digest_is_not_the_token() {
        let token = Uuid::new_v4().to_string();
        let digest = token_digest(&token);
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, token);
    }
}
