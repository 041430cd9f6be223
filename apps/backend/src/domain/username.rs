//! Username checks applied before any storage access.
//!
//! Usernames are bare, case-sensitive keys. Nothing is trimmed or folded;
//! a name is either accepted verbatim or rejected.

use crate::errors::domain::{DomainError, ValidationKind};

pub const MAX_USERNAME_LEN: usize = 64;

pub fn validate_username(username: &str) -> Result<&str, DomainError> {
    if username.trim().is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidUsername,
            "Username must not be empty",
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(DomainError::validation(
            ValidationKind::InvalidUsername,
            format!("Username must be at most {MAX_USERNAME_LEN} characters"),
        ));
    }
    if username.chars().any(char::is_control) {
        return Err(DomainError::validation(
            ValidationKind::InvalidUsername,
            "Username must not contain control characters",
        ));
    }
    Ok(username)
}
