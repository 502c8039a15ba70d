//! Input validation for lookup path segments.

use crate::{Result, VaultCredsError};

/// Validates a backend or role value before it is used in a lookup path.
///
/// Rejects:
/// - Empty values
/// - Null bytes
/// - Control characters
///
/// `/` is allowed. Nested mounts such as `teams/aws` are legal, and the
/// value is concatenated into the path unchanged. There is no length cap and
/// spaces are kept as given; the server decides whether such a path exists.
///
/// # Errors
///
/// Returns [`VaultCredsError::Validation`] naming `field` if validation fails.
///
/// # Example
///
/// ```
/// use vaultcreds::validation::validate_segment;
///
/// assert!(validate_segment("backend", "aws").is_ok());
/// assert!(validate_segment("backend", "teams/aws").is_ok());
/// assert!(validate_segment("role", "deploy-bot").is_ok());
///
/// assert!(validate_segment("role", "").is_err());
/// assert!(validate_segment("role", "bad\0role").is_err());
/// ```
pub fn validate_segment(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(VaultCredsError::Validation(format!(
            "{} cannot be empty",
            field
        )));
    }

    if value.contains('\0') {
        return Err(VaultCredsError::Validation(format!(
            "{} contains null byte",
            field
        )));
    }

    if value.chars().any(char::is_control) {
        return Err(VaultCredsError::Validation(format!(
            "{} contains control characters",
            field
        )));
    }

    Ok(())
}
