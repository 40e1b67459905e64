//! Domain model for full-backup listing entries from `Backups::listfullbackups`.

use crate::core::domain::value_object::serde_helpers;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Status string of a finished backup.
pub const STATUS_COMPLETE: &str = "complete";

/// A full backup known to the server.
///
/// cPanel lists entries in the order the backups were started, newest last.
/// Nothing in the API guarantees this, the backup workflow relies on it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackupEntry {
    /// Job status (e.g., "inprogress", "complete").
    #[serde(default)]
    pub status: String,
    /// Start time in the server's local time zone, preformatted.
    #[serde(default, rename = "localtime")]
    pub local_time: String,
    /// Backup file name relative to the account's home directory.
    #[serde(default)]
    pub file: String,
    /// Start time.
    #[serde(default = "epoch", with = "serde_helpers::system_time")]
    pub time: SystemTime,
    /// Failure reason, if any.
    #[serde(default)]
    pub reason: String,
    /// Success flag.
    #[serde(default, deserialize_with = "serde_helpers::bool_or_int::deserialize")]
    pub result: bool,
}

fn epoch() -> SystemTime {
    UNIX_EPOCH
}

impl BackupEntry {
    /// Returns true once the server reports the backup as finished.
    pub fn is_complete(&self) -> bool {
        self.status == STATUS_COMPLETE
    }
}
