use std::time::Duration;

/// Default response ceiling: 20 MiB plus a small margin.
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = (20 * 1024 * 1024) + 1337;

/// How server certificates are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVerification {
    /// Verify the certificate chain and host name.
    #[default]
    Strict,
    /// Accept any certificate. Only for hosts with self-signed certificates
    /// on a network you trust.
    AcceptInvalidCerts,
}

/// Tunables of the HTTP gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Responses reaching this many bytes are rejected.
    pub max_response_size: usize,
    /// Log URL, status, arguments and raw body of every call at `debug` level.
    pub debug_responses: bool,
    pub tls: TlsVerification,
    /// Timeout of a whole request, body included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            debug_responses: false,
            tls: TlsVerification::Strict,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}
