//! Form Validation
//!
//! Client-side checks run before any write is sent.

use crate::error::{ApiError, ApiResult, FieldError};
use crate::models::{Credentials, ProfileUpdate, SignUpForm};

/// Maximum length of a task description or comment, in characters.
pub const MAX_TEXT_LEN: usize = 255;

/// Trim `value` and check it holds 1..=255 characters.
pub fn validate_text(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid(vec![FieldError::new(field, "This field is required.")]));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::invalid(vec![FieldError::new(
            field,
            format!("Must be at most {} characters.", MAX_TEXT_LEN),
        )]));
    }
    Ok(trimmed.to_string())
}

pub fn validate_description(value: &str) -> ApiResult<String> {
    validate_text("description", value)
}

pub fn validate_comment(value: &str) -> ApiResult<String> {
    validate_text("content", value)
}

pub fn validate_credentials(credentials: &Credentials) -> ApiResult<()> {
    let mut fields = Vec::new();
    if credentials.username.trim().is_empty() {
        fields.push(FieldError::new("username", "Enter your username."));
    }
    if credentials.password.is_empty() {
        fields.push(FieldError::new("password", "Enter your password."));
    }
    finish(fields)
}

pub fn validate_sign_up(form: &SignUpForm) -> ApiResult<()> {
    let mut fields = Vec::new();
    if form.name.trim().chars().count() < 3 {
        fields.push(FieldError::new("name", "Enter your full name."));
    }
    if form.username.chars().count() < 3 {
        fields.push(FieldError::new("username", "Username must be at least 3 characters."));
    } else if !form.username.chars().all(|c| c.is_ascii_alphabetic()) {
        fields.push(FieldError::new("username", "Username may only contain letters."));
    }
    let password = &form.password;
    if password.chars().count() < 6
        || !password.chars().any(|c| c.is_ascii_uppercase())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        fields.push(FieldError::new(
            "password",
            "Password needs at least 6 characters, one uppercase letter and one number.",
        ));
    }
    finish(fields)
}

pub fn validate_profile(update: &ProfileUpdate) -> ApiResult<()> {
    let mut fields = Vec::new();
    if update.name.trim().is_empty() {
        fields.push(FieldError::new("name", "Name is required."));
    }
    let has_old = update.old_password.as_deref().is_some_and(|p| !p.is_empty());
    let has_new = update.new_password.as_deref().is_some_and(|p| !p.is_empty());
    if has_old && !has_new {
        fields.push(FieldError::new(
            "newPassword",
            "A new password is required when the old password is given.",
        ));
    }
    finish(fields)
}

fn finish(fields: Vec<FieldError>) -> ApiResult<()> {
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ApiError::invalid(fields))
    }
}
