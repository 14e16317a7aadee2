//! Input validation helpers.
//!
//! Request structs derive [`validator::Validate`]; [`validate_input`] turns a
//! failed check into a single human-readable [`CoreError::Validation`].

use validator::{Validate, ValidationErrors};

use crate::error::CoreError;

/// Maximum length for a natural key such as `employee_id` or `project_code`.
pub const MAX_CODE_LEN: usize = 64;

/// Minimum password length for user accounts.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Run derived field rules and map failures to [`CoreError::Validation`].
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(validation_message(&errors)))
}

/// Flatten field errors into one message, sorted for stable output.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{field} is invalid ({})", e.code),
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join("; ")
}

/// A natural key must be non-blank, bounded, and free of whitespace.
pub fn validate_code(label: &str, code: &str) -> Result<(), CoreError> {
    if code.trim().is_empty() {
        return Err(CoreError::Validation(format!("{label} is required")));
    }
    if code.len() > MAX_CODE_LEN {
        return Err(CoreError::Validation(format!(
            "{label} too long: {} chars (max {MAX_CODE_LEN})",
            code.len()
        )));
    }
    if code.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(format!(
            "{label} must not contain spaces"
        )));
    }
    Ok(())
}

/// Reject blank values for required free-text fields.
pub fn require_text(label: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{label} is required")));
    }
    Ok(())
}
