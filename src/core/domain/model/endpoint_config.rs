//! Credentials file for a cPanel account.
//!
//! ```json
//! { "hostname": "panel.example.com", "port": "2083", "username": "bob", "password": "x" }
//! ```

use crate::core::domain::{
    error::{CpanelError, CpanelResult},
    value_object::{CpanelHost, CpanelPassword, CpanelPort, CpanelUsername, serde_helpers},
};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct RawEndpointConfig {
    hostname: String,
    #[serde(deserialize_with = "serde_helpers::number_or_string::deserialize")]
    port: u64,
    username: String,
    password: String,
}

/// Validated endpoint configuration: where to connect and as whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub host: CpanelHost,
    pub port: CpanelPort,
    pub username: CpanelUsername,
    pub password: CpanelPassword,
}

impl EndpointConfig {
    pub fn new(
        host: CpanelHost,
        port: CpanelPort,
        username: CpanelUsername,
        password: CpanelPassword,
    ) -> Self {
        Self {
            host,
            port,
            username,
            password,
        }
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    /// `CpanelError::Configuration` if the JSON is malformed,
    /// `CpanelError::Validation` if a field is invalid.
    pub fn from_json(json: &str) -> CpanelResult<Self> {
        let raw: RawEndpointConfig = serde_json::from_str(json).map_err(|e| {
            CpanelError::Configuration(format!("Malformed cPanel configuration: {}", e))
        })?;

        let port = u16::try_from(raw.port)
            .map_err(|_| CpanelError::Configuration(format!("Port {} out of range", raw.port)))?;

        Ok(Self {
            host: CpanelHost::new(raw.hostname)?,
            port: CpanelPort::new(port)?,
            username: CpanelUsername::new(raw.username)?,
            password: CpanelPassword::new(raw.password)?,
        })
    }

    /// Reads and validates the configuration file at `path`.
    pub async fn from_file(path: impl AsRef<Path>) -> CpanelResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            CpanelError::Configuration(format!(
                "Could not load cPanel config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_json(&contents)?;
        tracing::debug!(
            path = %path.display(),
            host = config.host.as_str(),
            port = config.port.get(),
            username = config.username.as_str(),
            "loaded cPanel configuration"
        );
        Ok(config)
    }
}
