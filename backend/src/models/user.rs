//! Accounts and bearer tokens.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::validation::FieldErrors;
use crate::define_id_type;

define_id_type!(i64, UserId);

pub const PASSWORD_MIN_LEN: usize = 5;

/// An authenticated identity. Everything else in the system hangs off a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Always stored lowercased.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

/// Row data for a user that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

/// Partial account update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password_hash.is_none()
    }
}

/// Issued login token. Only the SHA-256 digest of the token is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub digest: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Raw credentials as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Credentials that passed field validation.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl CredentialsInput {
    /// Validate for registration: well-formed email and a long enough password.
    pub fn into_registration(self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = errors
            .require_text("email", self.email.as_deref(), Some(255))
            .and_then(|e| check_email(&mut errors, &e));
        let password = errors
            .require_text("password", self.password.as_deref(), None)
            .and_then(|p| check_password(&mut errors, p));
        errors.into_result()?;
        match (email, password) {
            (Some(email), Some(password)) => Ok(Credentials { email, password }),
            _ => Err(FieldErrors::single("non_field_errors", "Invalid credentials.")),
        }
    }

    /// Validate for login: both fields present, no format rules.
    pub fn into_login(self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = errors.require_text("email", self.email.as_deref(), None);
        let password = errors.require_text("password", self.password.as_deref(), None);
        errors.into_result()?;
        match (email, password) {
            (Some(email), Some(password)) => Ok(Credentials {
                email: normalize_email(&email),
                password,
            }),
            _ => Err(FieldErrors::single("non_field_errors", "Invalid credentials.")),
        }
    }

    /// Validate an account update; absent fields are left unchanged.
    pub fn into_update(self) -> Result<(Option<String>, Option<String>), FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = errors
            .optional_text("email", self.email.as_deref(), Some(255))
            .and_then(|e| check_email(&mut errors, &e));
        let password = errors
            .optional_text("password", self.password.as_deref(), None)
            .and_then(|p| check_password(&mut errors, p));
        errors.into_result()?;
        Ok((email, password))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(errors: &mut FieldErrors, email: &str) -> Option<String> {
    let email = normalize_email(email);
    if email_address::EmailAddress::is_valid(&email) && has_hostname_domain(&email) {
        Some(email)
    } else {
        errors.add("email", "Enter a valid email address.");
        None
    }
}

/// The domain must be a dotted hostname: `[a-z0-9-]` labels, none empty and
/// none starting or ending with `-`.
fn has_hostname_domain(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    domain.contains('.')
        && domain.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

fn check_password(errors: &mut FieldErrors, password: String) -> Option<String> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        errors.add(
            "password",
            format!(
                "Ensure this field has at least {} characters.",
                PASSWORD_MIN_LEN
            ),
        );
        None
    } else {
        Some(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(email: Option<&str>, password: Option<&str>) -> CredentialsInput {
        CredentialsInput {
            email: email.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_registration_normalizes_email() {
        let creds = input(Some("  Alice@Example.COM "), Some("secret1"))
            .into_registration()
            .unwrap();
        assert_eq!(creds.email, "alice@example.com");
    }

    #[test]
    fn test_registration_rejects_bad_email_and_short_password() {
        let errors = input(Some("not-an-email"), Some("abc"))
            .into_registration()
            .unwrap_err();
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
    }

    #[test]
    fn test_registration_rejects_malformed_domains() {
        for email in ["a@b..com", "a@-b.com", "a@b.c_m", "a@localhost", "a@@b.com"] {
            let errors = input(Some(email), Some("long-enough"))
                .into_registration()
                .unwrap_err();
            assert!(errors.get("email").is_some(), "{} was accepted", email);
        }
        let credentials = input(Some("Jane.Doe@Example.COM"), Some("long-enough"))
            .into_registration()
            .unwrap();
        assert_eq!(credentials.email, "jane.doe@example.com");
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = input(None, None).into_login().unwrap_err();
        assert_eq!(errors.fields().count(), 2);
    }

    #[test]
    fn test_update_allows_partial() {
        let (email, password) = input(None, Some("longer-password"))
            .into_update()
            .unwrap();
        assert!(email.is_none());
        assert_eq!(password.as_deref(), Some("longer-password"));
    }
}
