use crate::core::domain::error::ValidationError;
use std::fmt;

/// A cPanel account password (plaintext, only kept for basic auth).
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct CpanelPassword(String);

impl CpanelPassword {
    /// Creates a validated password.
    pub fn new(password: impl Into<String>) -> Result<Self, ValidationError> {
        let password = password.into();
        validate_password(&password)?;
        Ok(Self(password))
    }

    /// Creates a new password without validation.
    #[allow(unused)]
    pub(crate) fn new_unchecked(password: String) -> Self {
        Self(password)
    }

    /// Returns the password as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CpanelPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CpanelPassword(***)")
    }
}

/// Validates a password.
pub(crate) fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Field {
            field: "password".to_string(),
            message: "Password cannot be empty".to_string(),
        });
    }
    if password.len() > 1024 {
        return Err(ValidationError::Format(
            "Password cannot exceed 1024 characters".to_string(),
        ));
    }
    Ok(())
}
