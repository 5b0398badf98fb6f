//! File syncer capability and its rsync implementation.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::command::{check_rsync, RsyncCommand};
use crate::error::{SyncError, SyncResult};

/// SSH credentials for the remote shell.
#[derive(Debug, Clone)]
pub struct SshCredentials {
    /// Private key passed with `ssh -i`
    pub identity_file: PathBuf,
    /// Whether ssh verifies the remote host key
    pub strict_host_key_checking: bool,
}

impl SshCredentials {
    /// Credentials for unattended use: host-key verification disabled.
    pub fn unattended(identity_file: impl Into<PathBuf>) -> Self {
        Self {
            identity_file: identity_file.into(),
            strict_host_key_checking: false,
        }
    }
}

/// Captured output of a successful sync.
///
/// rsync can exit 0 and still print warnings (vanished files, skipped
/// special files) on stderr.
#[derive(Debug, Clone, Default)]
pub struct SyncOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Capability to mirror a local directory to a remote destination.
#[async_trait]
pub trait FileSyncer: Send + Sync {
    async fn mirror(
        &self,
        source: &str,
        destination: &str,
        credentials: &SshCredentials,
    ) -> SyncResult<SyncOutput>;
}

/// Runs `rsync` over ssh with a timeout.
#[derive(Debug, Clone)]
pub struct RsyncSyncer {
    /// rsync binary name or path
    program: String,
    /// Kill rsync after this long
    timeout: Duration,
}

impl Default for RsyncSyncer {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}

impl RsyncSyncer {
    /// Create a syncer that runs `rsync` from `PATH`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "rsync".to_string(),
            timeout,
        }
    }

    /// Use a different rsync binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl FileSyncer for RsyncSyncer {
    async fn mirror(
        &self,
        source: &str,
        destination: &str,
        credentials: &SshCredentials,
    ) -> SyncResult<SyncOutput> {
        let binary = check_rsync(&self.program)?;

        let cmd = RsyncCommand::new(source, destination)
            .ssh_identity(&credentials.identity_file, credentials.strict_host_key_checking);
        info!("Running command: {}", cmd.display(&self.program));

        let child = Command::new(&binary)
            .args(cmd.build_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(SyncError::Spawn)?;

        // Dropping the wait future on timeout kills the child
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(SyncError::Spawn)?,
            Err(_) => {
                let secs = self.timeout.as_secs();
                warn!("rsync timed out after {} seconds, killing process", secs);
                return Err(SyncError::Timeout(secs));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            debug!("rsync finished with {} bytes of output", stdout.len());
            Ok(SyncOutput { stdout, stderr })
        } else {
            Err(SyncError::failed(output.status.code(), stderr))
        }
    }
}
