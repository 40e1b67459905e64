use crate::{
    backup::application::response::backup_response::{BackupListResponse, FullBackupData},
    core::{
        domain::{error::CpanelResult, model::api_request::ApiArgs, model::backup_entry::BackupEntry},
        infrastructure::api_client::ApiClient,
    },
};
use async_trait::async_trait;

/// The remote calls the backup workflow depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackupApi: Send + Sync {
    /// Lists the account's full backups, in server order.
    async fn list_full_backups(&self) -> CpanelResult<Vec<BackupEntry>>;

    /// Starts a full backup into the account's home directory.
    async fn request_full_backup(&self) -> CpanelResult<FullBackupData>;
}

#[async_trait]
impl BackupApi for ApiClient {
    async fn list_full_backups(&self) -> CpanelResult<Vec<BackupEntry>> {
        // A null `cpanelresult` means no backups.
        let response: Option<BackupListResponse> = self
            .call_legacy("Backups", "listfullbackups", ApiArgs::new())
            .await?;
        response.unwrap_or_default().into_entries()
    }

    async fn request_full_backup(&self) -> CpanelResult<FullBackupData> {
        let data: Option<FullBackupData> = self
            .call_modern(
                "Backup",
                "fullbackup_to_homedir",
                ApiArgs::new().with("email", ""),
            )
            .await?;
        Ok(data.unwrap_or_default())
    }
}

