use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration data after validation and password hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}

pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), DomainError> {
    if username.trim().is_empty() {
        return Err(DomainError::InvalidInput(
            "username must not be blank".to_string(),
        ));
    }
    if !is_plausible_email(email) {
        return Err(DomainError::InvalidInput(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::InvalidInput(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}
