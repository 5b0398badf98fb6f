//! One-way file mirroring to a remote host.
//!
//! This crate provides:
//! - `RsyncCommand`, a builder for the `rsync` invocation
//! - `FileSyncer`, the capability the job runner depends on
//! - `RsyncSyncer`, which runs `rsync` over ssh with a timeout

pub mod command;
pub mod error;
pub mod syncer;

pub use command::{check_rsync, RsyncCommand};
pub use error::{SyncError, SyncResult};
pub use syncer::{FileSyncer, RsyncSyncer, SshCredentials, SyncOutput};
