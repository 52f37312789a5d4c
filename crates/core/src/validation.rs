//! Field validation helpers shared by the DB and API layers.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Maximum length for names and titles.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum number of items accepted by a batch endpoint.
pub const MAX_BATCH_SIZE: usize = 500;

/// Validate a required, human-readable name (`field` is used in the message).
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate e-mail syntax.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.trim().is_empty() {
        return Err(CoreError::Validation("email is required".to_string()));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "Invalid email address '{email}'"
        )));
    }
    Ok(())
}

/// Validate a `#RRGGBB` colour.
pub fn validate_color(color: &str) -> Result<(), CoreError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must be in #RRGGBB hex format"
        )))
    }
}

/// Validate the size of a batch request.
pub fn validate_batch_size(len: usize) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::Validation(
            "Batch must contain at least one item".to_string(),
        ));
    }
    if len > MAX_BATCH_SIZE {
        return Err(CoreError::Validation(format!(
            "Batch must contain at most {MAX_BATCH_SIZE} items"
        )));
    }
    Ok(())
}
