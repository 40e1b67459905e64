use crate::core::domain::{
    error::CpanelResult,
    model::{
        backup_entry::BackupEntry,
        envelope::{Api2Event, Envelope},
    },
};
use serde::Deserialize;
use std::borrow::Cow;

/// Payload of `Backups::listfullbackups` (API2).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackupListResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub event: Option<Api2Event>,
    #[serde(default)]
    pub data: Vec<BackupEntry>,
}

impl Envelope for BackupListResponse {
    fn error_message(&self) -> Option<Cow<'_, str>> {
        (!self.error.is_empty()).then_some(Cow::Borrowed(self.error.as_str()))
    }
}

impl BackupListResponse {
    /// Checks the envelope and returns the listed backups in server order.
    pub fn into_entries(self) -> CpanelResult<Vec<BackupEntry>> {
        self.check()?;
        Ok(self.data)
    }
}

/// `data` of `Backup::fullbackup_to_homedir` (UAPI).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FullBackupData {
    /// Process id of the backup job, when the server reports one.
    #[serde(default)]
    pub pid: Option<String>,
}
