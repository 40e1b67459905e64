use crate::core::domain::error::{CpanelError, CpanelResult};
use tokio::net::TcpStream;
use tokio::time::Duration;

/// Opens and immediately drops a TCP connection to `host:port`.
///
/// # Errors
/// Returns `CpanelError::Connection` if the dial fails or takes longer than `timeout`.
pub async fn probe_tcp(host: &str, port: u16, timeout: Duration) -> CpanelResult<()> {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => Err(CpanelError::Connection(format!(
            "Cannot reach {}:{}: {}",
            host, port, e
        ))),
        Err(_) => Err(CpanelError::Connection(format!(
            "Timed out reaching {}:{} after {:?}",
            host, port, timeout
        ))),
    }
}
