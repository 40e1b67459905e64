//! HTTP gateway to the cPanel UAPI and legacy JSON APIs.

use crate::core::domain::{
    error::{CpanelError, CpanelResult},
    model::{
        api_request::{ApiArgs, ApiRequest, ApiVersion},
        client_config::{ClientConfig, TlsVerification},
        cpanel_connection::CpanelConnection,
        envelope::{Api2Envelope, UapiEnvelope},
    },
};
use reqwest::{
    Client, Response,
    header::{ACCEPT, CONNECTION, HeaderMap, HeaderValue},
    redirect::Policy,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Gateway that builds, authenticates and executes cPanel API calls.
///
/// Every request carries HTTP basic auth for the connection's account. The
/// underlying HTTP client is created on the first call and reused; it keeps
/// at most one idle connection and asks the server to close each one after
/// the response, trading throughput for fresh connections.
#[derive(Debug)]
pub struct ApiClient {
    http_client: OnceCell<Client>,
    connection: Arc<CpanelConnection>,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    /// Creates a new `ApiClient`. No network traffic happens until the first call.
    pub fn new(connection: CpanelConnection, config: ClientConfig) -> Self {
        Self {
            http_client: OnceCell::new(),
            connection: Arc::new(connection),
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &CpanelConnection {
        &self.connection
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Calls a UAPI function and decodes its `data` into `T`.
    ///
    /// # Errors
    /// Transport and decode errors, or `CpanelError::Api` when the envelope
    /// reports a failure. The envelope is checked before `data` is decoded.
    pub async fn call_modern<T>(&self, module: &str, function: &str, args: ApiArgs) -> CpanelResult<T>
    where
        T: DeserializeOwned,
    {
        let request = ApiRequest::new(ApiVersion::Uapi, module, function, args);
        let envelope: UapiEnvelope = self.execute(&request).await?;
        envelope.into_data()
    }

    /// Calls an API2 function and decodes its `cpanelresult` into `T`.
    ///
    /// # Errors
    /// Transport and decode errors, or `CpanelError::Api` when the outer
    /// envelope reports a failure. The envelope is checked before
    /// `cpanelresult` is decoded.
    pub async fn call_legacy<T>(&self, module: &str, function: &str, args: ApiArgs) -> CpanelResult<T>
    where
        T: DeserializeOwned,
    {
        self.call_json_api(ApiVersion::Api2, module, function, args)
            .await
    }

    /// Calls an API1 function; see [`ApiArgs::to_query_pairs`] for how arguments are sent.
    pub async fn call_legacy_v1<T>(
        &self,
        module: &str,
        function: &str,
        args: ApiArgs,
    ) -> CpanelResult<T>
    where
        T: DeserializeOwned,
    {
        self.call_json_api(ApiVersion::Api1, module, function, args)
            .await
    }

    /// Calls a function with the API version given as text (`"uapi"`, `"2"` or `"1"`).
    ///
    /// # Errors
    /// Returns `CpanelError::Configuration` for an unknown version, before any request is sent.
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
        match version.parse::<ApiVersion>()? {
            ApiVersion::Uapi => self.call_modern(module, function, args).await,
            legacy => self.call_json_api(legacy, module, function, args).await,
        }
    }

    async fn call_json_api<T>(
        &self,
        version: ApiVersion,
        module: &str,
        function: &str,
        args: ApiArgs,
    ) -> CpanelResult<T>
    where
        T: DeserializeOwned,
    {
        let request = ApiRequest::new(version, module, function, args);
        let envelope: Api2Envelope = self.execute(&request).await?;
        envelope.into_result()
    }

    /// Sends `request` and decodes the raw body into `T`, without envelope handling.
    ///
    /// # Errors
    /// - `CpanelError::Connection` if the request cannot be sent
    /// - `CpanelError::HttpStatus` for a status of 300 or above
    /// - `CpanelError::ResponseTooLarge` if the body reaches the size ceiling
    /// - `CpanelError::Decode` if the body is not the expected JSON
    pub async fn execute<T>(&self, request: &ApiRequest) -> CpanelResult<T>
    where
        T: DeserializeOwned,
    {
        let url = request.build_url(
            self.connection.base_url(),
            self.connection.username().as_str(),
        )?;

        tracing::debug!(
            version = %request.version,
            module = %request.module,
            function = %request.function,
            arguments = request.arguments.len(),
            "calling cPanel API"
        );

        let response = self
            .http_client()
            .await?
            .get(url.clone())
            .basic_auth(
                self.connection.username().as_str(),
                Some(self.connection.password().as_str()),
            )
            .send()
            .await
            .map_err(|e| CpanelError::Connection(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.as_u16() >= 300 {
            if self.config.debug_responses {
                tracing::debug!(%url, %status, function = %request.function, "cPanel API rejected request");
            }
            return Err(CpanelError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let limit = self.config.max_response_size;
        let body = read_limited(response, limit).await?;

        if self.config.debug_responses {
            tracing::debug!(
                %url,
                %status,
                function = %request.function,
                arguments = ?request.arguments,
                body = %String::from_utf8_lossy(&body),
                "cPanel API response"
            );
        }

        if body.len() >= limit {
            return Err(CpanelError::ResponseTooLarge { limit });
        }

        serde_json::from_slice(&body)
            .map_err(|e| CpanelError::Decode(format!("Failed to parse response: {}", e)))
    }

    /// Returns the shared HTTP client, building it on first use.
    async fn http_client(&self) -> CpanelResult<&Client> {
        self.http_client
            .get_or_try_init(|| async { build_http_client(&self.config) })
            .await
    }
}

fn build_http_client(config: &ClientConfig) -> CpanelResult<Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    default_headers.insert(CONNECTION, HeaderValue::from_static("close"));

    if config.tls == TlsVerification::AcceptInvalidCerts {
        tracing::warn!("TLS certificate verification is disabled");
    }

    Client::builder()
        .default_headers(default_headers)
        .danger_accept_invalid_certs(config.tls == TlsVerification::AcceptInvalidCerts)
        .pool_max_idle_per_host(1)
        .redirect(Policy::none())
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|e| CpanelError::Connection(e.to_string()))
}

/// Reads at most `limit` bytes of the body.
///
/// Stops as soon as the limit is reached, so a body of `limit` bytes or more
/// comes back exactly `limit` bytes long.
async fn read_limited(mut response: Response, limit: usize) -> CpanelResult<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| CpanelError::Connection(format!("Failed to read response body: {}", e)))?
    {
        let take = chunk.len().min(limit - body.len());
        body.extend_from_slice(&chunk[..take]);
        if body.len() >= limit {
            break;
        }
    }
    Ok(body)
}
