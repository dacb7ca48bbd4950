//! Common validation utilities.

use validator::ValidationError;

/// Validates that a display name contains at least one non-whitespace character.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Name must not be empty".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a reference to another record (e.g. a class selection) is present.
pub fn validate_reference(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("missing_reference");
        err.message = Some("A related record must be selected".into());
        Err(err)
    } else {
        Ok(())
    }
}
