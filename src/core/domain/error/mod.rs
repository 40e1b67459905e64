use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The main error type for cPanel operations.
///
/// Variants are grouped by [`ErrorKind`] so callers can decide a retry
/// policy per kind instead of matching every variant.
#[derive(Error, Debug)]
pub enum CpanelError {
    /// Invalid or unreadable configuration (credential file, API version)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `0` - The underlying validation error
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Represents errors that occur while reaching the host (dial, TLS, HTTP transport)
    ///
    /// # Fields
    /// * `0` - A description of what went wrong during the connection attempt
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server answered with a status code of 300 or above
    #[error("HTTP error: {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    /// The response body reached the configured ceiling
    #[error("API response maximum size exceeded ({limit} bytes)")]
    ResponseTooLarge { limit: usize },

    /// The response body could not be decoded into the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// The API envelope carried a non-empty error string
    #[error("API error: {0}")]
    Api(String),

    /// A backup workflow step failed
    #[error("Backup workflow error: {0}")]
    Workflow(String),

    /// The completed backup file could not be opened
    #[error("Cannot open backup artifact {}: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backup did not complete within the allowed wait
    #[error("Backup did not complete within {0:?}")]
    PollTimeout(Duration),

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// The downstream blob store rejected the artifact
    #[error("Upload error: {0}")]
    Upload(String),
}

/// Coarse classification of [`CpanelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Connectivity,
    Transport,
    SizeLimit,
    Protocol,
    Application,
    Workflow,
    Upload,
}

impl CpanelError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CpanelError::Configuration(_) | CpanelError::Validation(_) => ErrorKind::Configuration,
            CpanelError::Connection(_) => ErrorKind::Connectivity,
            CpanelError::HttpStatus { .. } => ErrorKind::Transport,
            CpanelError::ResponseTooLarge { .. } => ErrorKind::SizeLimit,
            CpanelError::Decode(_) => ErrorKind::Protocol,
            CpanelError::Api(_) => ErrorKind::Application,
            CpanelError::Workflow(_)
            | CpanelError::Artifact { .. }
            | CpanelError::PollTimeout(_)
            | CpanelError::Cancelled => ErrorKind::Workflow,
            CpanelError::Upload(_) => ErrorKind::Upload,
        }
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a CpanelError
pub type CpanelResult<T> = Result<T, CpanelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CpanelError::Configuration("x".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            CpanelError::HttpStatus {
                status: 401,
                reason: "Unauthorized".into()
            }
            .kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            CpanelError::ResponseTooLarge { limit: 10 }.kind(),
            ErrorKind::SizeLimit
        );
        assert_eq!(CpanelError::Api("denied".into()).kind(), ErrorKind::Application);
        assert_eq!(CpanelError::Cancelled.kind(), ErrorKind::Workflow);
    }

    #[test]
    fn test_validation_error_converts() {
        let err: CpanelError = ValidationError::Format("bad".to_string()).into();
        assert!(matches!(err, CpanelError::Validation(ValidationError::Format(_))));
        assert_eq!(err.to_string(), "Validation error: Format error: bad");
    }
}
