//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a required identifier or name carries at least one visible character.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("u-42")  // Ok
/// validate_not_blank("")      // Err - empty
/// validate_not_blank("   ")   // Err - whitespace only
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank_valid() {
        assert!(validate_not_blank("u1").is_ok());
        assert!(validate_not_blank(" Ann ").is_ok());
    }

    #[test]
    fn test_validate_not_blank_invalid() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("\t\n").is_err());
    }
}
