//! rsync command builder.

use std::path::{Path, PathBuf};

use crate::error::{SyncError, SyncResult};

/// Builder for rsync commands.
#[derive(Debug, Clone)]
pub struct RsyncCommand {
    /// Local source path
    source: String,
    /// Remote destination (`user@host:path`)
    destination: String,
    /// Option flags, before `-e`
    flags: Vec<String>,
    /// Remote shell passed with `-e`
    remote_shell: Option<String>,
}

impl RsyncCommand {
    /// Create a new rsync command in archive, compressed, verbose mode.
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            flags: vec!["-avz".to_string()],
            remote_shell: None,
        }
    }

    fn remote_shell(mut self, shell: impl Into<String>) -> Self {
        self.remote_shell = Some(shell.into());
        self
    }

    /// Use ssh with the given identity file as the remote shell.
    pub fn ssh_identity(self, identity_file: impl AsRef<Path>, strict_host_key_checking: bool) -> Self {
        let key = identity_file.as_ref().to_string_lossy().to_string();
        // rsync splits -e on whitespace but honours quotes
        let key = if key.chars().any(char::is_whitespace) {
            format!("'{}'", key)
        } else {
            key
        };
        let checking = if strict_host_key_checking { "yes" } else { "no" };

        self.remote_shell(format!("ssh -i {} -o StrictHostKeyChecking={}", key, checking))
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = self.flags.clone();

        if let Some(ref shell) = self.remote_shell {
            args.push("-e".to_string());
            args.push(shell.clone());
        }

        args.push(self.source.clone());
        args.push(self.destination.clone());

        args
    }

    /// Human-readable command line for logs.
    pub fn display(&self, program: &str) -> String {
        let mut parts = vec![program.to_string()];
        parts.extend(self.build_args());
        parts.join(" ")
    }
}

/// Check if the rsync binary is available.
pub fn check_rsync(program: &str) -> SyncResult<PathBuf> {
    which::which(program).map_err(|_| SyncError::RsyncNotFound(program.to_string()))
}
