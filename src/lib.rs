mod backup;
mod core;

pub use crate::backup::application::{
    blob_store::BlobStore,
    response::backup_response::{BackupListResponse, FullBackupData},
    service::{
        backup_api::BackupApi,
        backup_service::{
            BackupBaseline, BackupOptions, BackupService, BackupState, PollOutcome,
            artifact_path, detect_completion,
        },
    },
};
pub use crate::core::domain::{
    error::{CpanelError, CpanelResult, ErrorKind, ValidationError},
    model::{
        api_request::{ApiArgs, ApiRequest, ApiVersion},
        backup_artifact::BackupArtifact,
        backup_entry::{BackupEntry, STATUS_COMPLETE},
        client_config::{ClientConfig, DEFAULT_MAX_RESPONSE_SIZE, TlsVerification},
        cpanel_connection::CpanelConnection,
        endpoint_config::EndpointConfig,
        envelope::{Api2Envelope, Api2Event, Envelope, UapiEnvelope},
    },
    value_object::{CpanelHost, CpanelPassword, CpanelPort, CpanelUsername},
};
pub use crate::core::infrastructure::{api_client::ApiClient, reachability::probe_tcp};
pub use tokio_util::sync::CancellationToken;

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// A client for the cPanel UAPI and legacy JSON APIs of one account.
///
/// Besides raw API calls, the client drives a complete full-backup run:
/// request, wait for completion, open the backup file and optionally hand it
/// to a [`BlobStore`].
///
/// # Examples
///
/// ```no_run
/// use cpanel_backup::{BackupOptions, CancellationToken, CpanelClient, CpanelResult};
///
/// #[tokio::main]
/// async fn main() -> CpanelResult<()> {
///     let client = CpanelClient::builder()
///         .host("panel.example.com")?
///         .credentials("bob", "secret")?
///         .build()?;
///
///     let artifact = client
///         .full_backup(BackupOptions::default(), &CancellationToken::new())
///         .await?;
///     println!("backup ready: {}", artifact.file_name());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CpanelClient {
    api_client: Arc<ApiClient>,
}

/// Builder for CpanelClient configuration
#[derive(Debug)]
pub struct CpanelClientBuilder {
    host: Option<CpanelHost>,
    port: Option<CpanelPort>,
    api_port: Option<CpanelPort>,
    username: Option<CpanelUsername>,
    password: Option<CpanelPassword>,
    secure: bool,
    config: ClientConfig,
}

impl Default for CpanelClientBuilder {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            api_port: None,
            username: None,
            password: None,
            secure: true,
            config: ClientConfig::default(),
        }
    }
}

impl CpanelClientBuilder {
    /// Starts a builder from a loaded configuration file.
    pub fn from_endpoint(endpoint: EndpointConfig) -> Self {
        Self {
            host: Some(endpoint.host),
            port: Some(endpoint.port),
            username: Some(endpoint.username),
            password: Some(endpoint.password),
            ..Self::default()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> CpanelResult<Self> {
        self.host = Some(CpanelHost::new(host)?);
        Ok(self)
    }

    /// Port probed before the backup starts. Defaults to the API port.
    pub fn port(mut self, port: u16) -> CpanelResult<Self> {
        self.port = Some(CpanelPort::new(port)?);
        Ok(self)
    }

    /// Port the APIs are served on, 2083 unless set.
    pub fn api_port(mut self, port: u16) -> CpanelResult<Self> {
        self.api_port = Some(CpanelPort::new(port)?);
        Ok(self)
    }

    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> CpanelResult<Self> {
        self.username = Some(CpanelUsername::new(username)?);
        self.password = Some(CpanelPassword::new(password)?);
        Ok(self)
    }

    /// Use HTTPS (the default) or plain HTTP.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn tls(mut self, tls: TlsVerification) -> Self {
        self.config.tls = tls;
        self
    }

    pub fn max_response_size(mut self, bytes: usize) -> Self {
        self.config.max_response_size = bytes;
        self
    }

    /// Log every call's URL, status and raw body at `debug` level.
    pub fn debug_responses(mut self, enabled: bool) -> Self {
        self.config.debug_responses = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> CpanelResult<CpanelClient> {
        let host = self.host.ok_or_else(|| missing("host", "Host is required"))?;
        let username = self
            .username
            .ok_or_else(|| missing("username", "Username is required"))?;
        let password = self
            .password
            .ok_or_else(|| missing("password", "Password is required"))?;

        if self.config.max_response_size == 0 {
            return Err(ValidationError::Field {
                field: "max_response_size".to_string(),
                message: "Response size limit must be positive".to_string(),
            }
            .into());
        }

        let api_port = self.api_port.unwrap_or(CpanelPort::API_DEFAULT);
        let port = self.port.unwrap_or(api_port);
        let endpoint = EndpointConfig::new(host, port, username, password);
        let connection = CpanelConnection::from_endpoint(endpoint, api_port, self.secure)?;
        tracing::debug!(
            host = connection.host().as_str(),
            api_port = api_port.get(),
            secure = self.secure,
            "built cPanel client"
        );

        Ok(CpanelClient {
            api_client: Arc::new(ApiClient::new(connection, self.config)),
        })
    }
}

fn missing(field: &str, message: &str) -> CpanelError {
    ValidationError::Field {
        field: field.to_string(),
        message: message.to_string(),
    }
    .into()
}

impl CpanelClient {
    /// Creates a new builder for CpanelClient configuration
    pub fn builder() -> CpanelClientBuilder {
        CpanelClientBuilder::default()
    }

    /// The underlying API gateway.
    pub fn api_client(&self) -> &ApiClient {
        &self.api_client
    }

    /// Calls a UAPI function and returns its `data`.
    pub async fn uapi<T>(&self, module: &str, function: &str, args: ApiArgs) -> CpanelResult<T>
    where
        T: DeserializeOwned,
    {
        self.api_client.call_modern(module, function, args).await
    }

    /// Calls an API2 function and returns its `cpanelresult`.
    pub async fn api2<T>(&self, module: &str, function: &str, args: ApiArgs) -> CpanelResult<T>
    where
        T: DeserializeOwned,
    {
        self.api_client.call_legacy(module, function, args).await
    }

    /// Calls an API1 function and returns its `cpanelresult`.
    pub async fn api1<T>(&self, module: &str, function: &str, args: ApiArgs) -> CpanelResult<T>
    where
        T: DeserializeOwned,
    {
        self.api_client.call_legacy_v1(module, function, args).await
    }

    /// Calls a function with the API version given as text (`"uapi"`, `"2"` or `"1"`).
    pub async fn call<T>(
        &self,
        version: &str,
        module: &str,
        function: &str,
        args: ApiArgs,
    ) -> CpanelResult<T>
    where
        T: DeserializeOwned,
    {
        self.api_client.call(version, module, function, args).await
    }

    /// Dials the configured host and port once.
    ///
    /// # Errors
    /// `CpanelError::Connection` if nothing accepts the connection within `timeout`.
    pub async fn check_reachability(&self, timeout: Duration) -> CpanelResult<()> {
        let connection = self.api_client.connection();
        probe_tcp(connection.host().as_str(), connection.port().get(), timeout).await
    }

    /// A backup workflow for this account, for callers that want to observe its state.
    pub fn backup_service(&self, options: BackupOptions) -> BackupService<ApiClient> {
        BackupService::new(
            self.api_client.clone(),
            self.api_client.connection().endpoint(),
            options,
        )
    }

    /// Runs a full backup and returns the finished backup file, opened for reading.
    ///
    /// # Errors
    /// See [`BackupService::run`].
    pub async fn full_backup(
        &self,
        options: BackupOptions,
        cancel: &CancellationToken,
    ) -> CpanelResult<BackupArtifact> {
        self.backup_service(options).run(cancel).await
    }

    /// Runs a full backup and streams the result into `store`.
    ///
    /// Returns the backup file name the artifact was stored under.
    pub async fn backup_to(
        &self,
        store: &dyn BlobStore,
        options: BackupOptions,
        cancel: &CancellationToken,
    ) -> CpanelResult<String> {
        let (file_name, file) = self.full_backup(options, cancel).await?.into_parts();
        store.upload(&file_name, Box::new(file)).await?;
        tracing::info!(file = %file_name, "backup handed to blob store");
        Ok(file_name)
    }
}

#[cfg(test)]
mod tests;
