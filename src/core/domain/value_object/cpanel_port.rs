use crate::core::domain::error::ValidationError;
use std::fmt;

/// A validated TCP port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpanelPort(u16);

impl CpanelPort {
    /// Port of the cPanel user interface and its JSON APIs.
    pub const API_DEFAULT: CpanelPort = CpanelPort(2083);

    /// Creates a validated port.
    pub fn new(port: u16) -> Result<Self, ValidationError> {
        validate_port(port)?;
        Ok(Self(port))
    }

    /// Parses a port from its decimal text form, as found in configuration files.
    pub fn parse(port: &str) -> Result<Self, ValidationError> {
        let value = port.trim().parse::<u16>().map_err(|_| ValidationError::Field {
            field: "port".to_string(),
            message: format!("'{}' is not a valid port number", port),
        })?;
        Self::new(value)
    }

    /// Returns the port number.
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for CpanelPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validates a port number.
pub(crate) fn validate_port(port: u16) -> Result<(), ValidationError> {
    if port == 0 {
        return Err(ValidationError::Field {
            field: "port".to_string(),
            message: "Port cannot be 0".to_string(),
        });
    }
    Ok(())
}
