// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Field validation, independent of the storage layer.
//!
//! Every rule lives here so it can be exercised without a live store.
//! Validation returns on the first failing field; nothing is
//! aggregated.

use crate::error::AppError;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_TITLE_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 2000;
pub const MAX_PROGRESS: u8 = 100;

// Regex patterns for validation
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").unwrap());
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidUsername(String),

    #[error("{0}")]
    InvalidEmail(String),

    #[error("{0}")]
    InvalidPassword(String),

    #[error("{0}")]
    InvalidTitle(String),

    #[error("{0}")]
    InvalidDescription(String),

    #[error("{0}")]
    InvalidProgress(String),

    #[error("{0}")]
    MissingField(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Lowercase and trim an email before any check or write
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a username
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    if username.is_empty() {
        return Err(ValidationError::MissingField(
            "Username is required".to_string(),
        ));
    }

    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::InvalidUsername(format!(
            "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername(
            "Username must contain only letters, digits, and underscores".to_string(),
        ));
    }

    Ok(username)
}

/// Validate an already-normalized email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email must be at most {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Email address is not valid".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a password
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(password)
}

/// Validate a goal title
pub fn validate_title(title: &str) -> ValidationResult<&str> {
    if title.is_empty() {
        return Err(ValidationError::MissingField(
            "Title is required".to_string(),
        ));
    }

    if title.len() > MAX_TITLE_LENGTH {
        return Err(ValidationError::InvalidTitle(format!(
            "Title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }

    Ok(title)
}

/// Validate a goal description
pub fn validate_description(description: &str) -> ValidationResult<&str> {
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::InvalidDescription(format!(
            "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }

    Ok(description)
}

/// Validate a progress percentage
pub fn validate_progress(progress: u8) -> ValidationResult<u8> {
    if progress > MAX_PROGRESS {
        return Err(ValidationError::InvalidProgress(format!(
            "Progress must be between 0 and {MAX_PROGRESS}"
        )));
    }

    Ok(progress)
}
