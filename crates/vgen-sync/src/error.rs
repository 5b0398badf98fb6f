//! Error types for sync operations.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while mirroring files.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0} not found in PATH")]
    RsyncNotFound(String),

    #[error("Failed to launch rsync: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("rsync timed out after {0} seconds")]
    Timeout(u64),

    #[error("rsync exited with status {}: {stderr}", describe_exit(.exit_code))]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

impl SyncError {
    /// Create a non-zero exit error.
    pub fn failed(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::Failed {
            exit_code,
            stderr: stderr.into(),
        }
    }
}
