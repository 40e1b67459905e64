//! Full-backup workflow: request a backup, wait for it, open the result.

use crate::{
    backup::application::service::backup_api::BackupApi,
    core::{
        domain::{
            error::{CpanelError, CpanelResult},
            model::{
                backup_artifact::BackupArtifact, backup_entry::BackupEntry,
                endpoint_config::EndpointConfig,
            },
            value_object::CpanelUsername,
        },
        infrastructure::reachability::probe_tcp,
    },
};
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::time::{Duration, Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;

/// Where a backup run currently stands. `Complete` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupState {
    Disconnected,
    Reachable,
    BackupRequested,
    Polling,
    Complete,
    Failed,
}

impl fmt::Display for BackupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackupState::Disconnected => "disconnected",
            BackupState::Reachable => "reachable",
            BackupState::BackupRequested => "backup-requested",
            BackupState::Polling => "polling",
            BackupState::Complete => "complete",
            BackupState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Timing and location settings of a backup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOptions {
    /// Timeout of the TCP reachability probe.
    pub dial_timeout: Duration,
    /// Pause between the backup request and the first poll, so the job can register.
    pub grace_delay: Duration,
    pub poll_interval: Duration,
    /// Longest wait for completion, counted from the backup request.
    pub max_wait: Duration,
    /// Directory holding the accounts' home directories.
    pub home_root: PathBuf,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            dial_timeout: Duration::from_secs(1),
            grace_delay: Duration::from_secs(10),
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(2 * 60 * 60),
            home_root: PathBuf::from("/home"),
        }
    }
}

/// The backups that existed before a new one was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupBaseline {
    count: usize,
    files: HashSet<String>,
}

impl BackupBaseline {
    pub fn from_entries(entries: &[BackupEntry]) -> Self {
        Self {
            count: entries.len(),
            files: entries.iter().map(|e| e.file.clone()).collect(),
        }
    }

    /// A baseline that only knows how many backups there were.
    pub fn from_count(count: usize) -> Self {
        Self {
            count,
            files: HashSet::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Result of inspecting one backup listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome<'a> {
    Pending,
    Complete(&'a BackupEntry),
}

/// Decides whether the requested backup has finished.
///
/// Nothing has happened until the listing is longer than the baseline. The
/// newest backup is then the last entry that was not already in the
/// baseline, or simply the last entry when the baseline holds no names.
pub fn detect_completion<'a>(
    baseline: &BackupBaseline,
    entries: &'a [BackupEntry],
) -> PollOutcome<'a> {
    if entries.len() <= baseline.count {
        return PollOutcome::Pending;
    }

    let newest = entries
        .iter()
        .rev()
        .find(|entry| !baseline.files.contains(&entry.file))
        .or_else(|| entries.last());

    match newest {
        Some(entry) if entry.is_complete() => PollOutcome::Complete(entry),
        _ => PollOutcome::Pending,
    }
}

/// Location of a finished backup: `{home_root}/{username}/{file_name}`.
///
/// # Errors
/// Returns `CpanelError::Workflow` unless `file_name` is a single plain path component.
pub fn artifact_path(
    home_root: &Path,
    username: &CpanelUsername,
    file_name: &str,
) -> CpanelResult<PathBuf> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {
            Ok(home_root.join(username.as_str()).join(file_name))
        }
        _ => Err(CpanelError::Workflow(format!(
            "Refusing unsafe backup file name '{}'",
            file_name
        ))),
    }
}

/// Drives one full backup of a cPanel account.
///
/// ```text
/// Disconnected -> Reachable -> BackupRequested -> Polling -> Complete
///        \____________\_______________\_____________\______-> Failed
/// ```
pub struct BackupService<A: BackupApi> {
    api: Arc<A>,
    endpoint: EndpointConfig,
    options: BackupOptions,
    state: BackupState,
}

impl<A: BackupApi> BackupService<A> {
    pub fn new(api: Arc<A>, endpoint: EndpointConfig, options: BackupOptions) -> Self {
        Self {
            api,
            endpoint,
            options,
            state: BackupState::Disconnected,
        }
    }

    pub fn state(&self) -> BackupState {
        self.state
    }

    /// Runs the whole workflow and returns the opened backup file.
    ///
    /// # Errors
    /// Any failing step ends the run in `BackupState::Failed`:
    /// - `CpanelError::Connection` if the host cannot be reached
    /// - `CpanelError::Workflow` if the server rejects the backup request
    /// - transport, size-limit and decode errors of the request, unchanged
    /// - `CpanelError::PollTimeout` / `CpanelError::Cancelled` while waiting
    /// - `CpanelError::Artifact` if the finished file cannot be opened
    pub async fn run(&mut self, cancel: &CancellationToken) -> CpanelResult<BackupArtifact> {
        let result = self.drive(cancel).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "backup run failed");
            self.transition(BackupState::Failed);
        }
        result
    }

    async fn drive(&mut self, cancel: &CancellationToken) -> CpanelResult<BackupArtifact> {
        self.check_reachability().await?;
        let baseline = self.snapshot_baseline().await;
        self.request_backup().await?;
        let entry = self.wait_for_completion(&baseline, cancel).await?;
        self.open_artifact(&entry.file).await
    }

    /// Dials the configured host and port once.
    pub async fn check_reachability(&mut self) -> CpanelResult<()> {
        probe_tcp(
            self.endpoint.host.as_str(),
            self.endpoint.port.get(),
            self.options.dial_timeout,
        )
        .await?;
        self.transition(BackupState::Reachable);
        Ok(())
    }

    /// Lists the existing backups. A failed listing counts as no backups.
    pub async fn snapshot_baseline(&mut self) -> BackupBaseline {
        match self.api.list_full_backups().await {
            Ok(entries) => {
                let baseline = BackupBaseline::from_entries(&entries);
                tracing::debug!(count = baseline.count(), "recorded backup baseline");
                baseline
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not list existing backups, assuming none");
                BackupBaseline::default()
            }
        }
    }

    /// Asks the server to start a full backup into the home directory.
    ///
    /// # Errors
    /// A rejection by the server becomes `CpanelError::Workflow`; transport,
    /// size-limit and decode errors keep their own kind.
    pub async fn request_backup(&mut self) -> CpanelResult<()> {
        let data = self.api.request_full_backup().await.map_err(|e| match e {
            CpanelError::Api(message) => {
                CpanelError::Workflow(format!("Full backup request failed: {}", message))
            }
            other => other,
        })?;
        tracing::info!(pid = data.pid.as_deref().unwrap_or("-"), "full backup requested");
        self.transition(BackupState::BackupRequested);
        Ok(())
    }

    /// Polls the backup listing until a backup newer than `baseline` is complete.
    ///
    /// Waits `grace_delay` first, then lists every `poll_interval`. Gives up
    /// after `max_wait` or as soon as `cancel` fires. Listing errors end the wait.
    pub async fn wait_for_completion(
        &mut self,
        baseline: &BackupBaseline,
        cancel: &CancellationToken,
    ) -> CpanelResult<BackupEntry> {
        let max_wait = self.options.max_wait;
        let deadline = Instant::now() + max_wait;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CpanelError::Cancelled),
            _ = sleep_until(deadline) => return Err(CpanelError::PollTimeout(max_wait)),
            _ = sleep(self.options.grace_delay) => {}
        }

        self.transition(BackupState::Polling);
        loop {
            if Instant::now() >= deadline {
                return Err(CpanelError::PollTimeout(max_wait));
            }

            let entries = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CpanelError::Cancelled),
                _ = sleep_until(deadline) => return Err(CpanelError::PollTimeout(max_wait)),
                entries = self.api.list_full_backups() => entries?,
            };

            match detect_completion(baseline, &entries) {
                PollOutcome::Complete(entry) => {
                    tracing::info!(file = %entry.file, "backup completed");
                    return Ok(entry.clone());
                }
                PollOutcome::Pending => {
                    tracing::debug!(
                        listed = entries.len(),
                        baseline = baseline.count(),
                        "backup still running"
                    );
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CpanelError::Cancelled),
                _ = sleep_until(deadline) => return Err(CpanelError::PollTimeout(max_wait)),
                _ = sleep(self.options.poll_interval) => {}
            }
        }
    }

    /// Opens the finished backup from the account's home directory.
    pub async fn open_artifact(&mut self, file_name: &str) -> CpanelResult<BackupArtifact> {
        let path = artifact_path(&self.options.home_root, &self.endpoint.username, file_name)?;
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|source| CpanelError::Artifact {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), "opened backup artifact");
        self.transition(BackupState::Complete);
        Ok(BackupArtifact::new(file_name, file))
    }

    fn transition(&mut self, next: BackupState) {
        tracing::info!(from = %self.state, to = %next, "backup state changed");
        self.state = next;
    }
}
