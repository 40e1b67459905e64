//! Boundary to the storage service that receives finished backups.

use crate::core::domain::error::CpanelResult;
use async_trait::async_trait;
use tokio::io::AsyncRead;

/// Destination for a backup artifact, e.g. an object-storage bucket.
///
/// Implementations own `reader` once called and must drop it when done;
/// failures should be reported as `CpanelError::Upload`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        name: &str,
        reader: Box<dyn AsyncRead + Send + Unpin>,
    ) -> CpanelResult<()>;
}
