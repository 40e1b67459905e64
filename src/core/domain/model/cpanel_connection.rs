use crate::core::domain::{
    error::{CpanelError, CpanelResult},
    model::endpoint_config::EndpointConfig,
    value_object::{CpanelHost, CpanelPassword, CpanelPort, CpanelUsername},
};
use std::net::Ipv6Addr;
use url::Url;

/// Everything needed to reach one cPanel account.
///
/// `port` is the port probed before any API traffic, `api_port` the port the
/// JSON APIs are served on.
#[derive(Debug, Clone)]
pub struct CpanelConnection {
    host: CpanelHost,
    port: CpanelPort,
    api_port: CpanelPort,
    username: CpanelUsername,
    password: CpanelPassword,
    secure: bool,
    base_url: Url,
}

impl CpanelConnection {
    pub fn new(
        host: CpanelHost,
        port: CpanelPort,
        api_port: CpanelPort,
        username: CpanelUsername,
        password: CpanelPassword,
        secure: bool,
    ) -> CpanelResult<Self> {
        let scheme = if secure { "https" } else { "http" };
        let authority = if host.as_str().parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", host.as_str())
        } else {
            host.as_str().to_string()
        };
        let base_url = Url::parse(&format!("{}://{}:{}/", scheme, authority, api_port))
            .map_err(|e| CpanelError::Configuration(format!("Invalid base URL: {}", e)))?;

        Ok(Self {
            host,
            port,
            api_port,
            username,
            password,
            secure,
            base_url,
        })
    }

    /// Builds a connection from a loaded configuration file.
    pub fn from_endpoint(
        endpoint: EndpointConfig,
        api_port: CpanelPort,
        secure: bool,
    ) -> CpanelResult<Self> {
        Self::new(
            endpoint.host,
            endpoint.port,
            api_port,
            endpoint.username,
            endpoint.password,
            secure,
        )
    }

    pub fn host(&self) -> &CpanelHost {
        &self.host
    }

    pub fn port(&self) -> CpanelPort {
        self.port
    }

    pub fn api_port(&self) -> CpanelPort {
        self.api_port
    }

    pub fn username(&self) -> &CpanelUsername {
        &self.username
    }

    pub fn password(&self) -> &CpanelPassword {
        &self.password
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// The dial target and credentials as an endpoint configuration.
    pub fn endpoint(&self) -> EndpointConfig {
        EndpointConfig::new(
            self.host.clone(),
            self.port,
            self.username.clone(),
            self.password.clone(),
        )
    }

    /// Scheme, host and API port, with a trailing slash.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}
