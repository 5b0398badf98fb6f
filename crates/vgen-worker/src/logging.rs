//! Logging setup and structured run logging.
//!
//! Log lines go to stdout and to a file. The file is rotated on every start:
//! the previous file is kept as `<file>.1`.

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

use vgen_api_client::ClientError;
use vgen_models::{Category, RunId, RunReport};
use vgen_sync::{SyncError, SyncOutput};

use crate::config::LogConfig;
use crate::error::WorkerResult;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber: stdout plus the rotated log file.
///
/// Returns the log file path when the file sink could be opened. Falls back
/// to stdout only otherwise.
pub fn init_tracing(config: &LogConfig) -> Option<PathBuf> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.json {
        layers.push(fmt::layer().json().boxed());
    } else {
        layers.push(fmt::layer().with_ansi(true).with_target(false).boxed());
    }

    let file_error = match prepare_log_file(&config.file) {
        Ok(file) => {
            let writer = Arc::new(file);
            if config.json {
                layers.push(fmt::layer().json().with_writer(writer).boxed());
            } else {
                layers.push(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_writer(writer)
                        .boxed(),
                );
            }
            None
        }
        Err(e) => Some(e),
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    match file_error {
        None => Some(config.file.clone()),
        Some(e) => {
            warn!(
                "Could not open log file {}, logging to stdout only: {}",
                config.file.display(),
                e
            );
            None
        }
    }
}

/// Rotate any existing log file to `<file>.1` and open a fresh one.
pub fn prepare_log_file(path: &Path) -> WorkerResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    if path.exists() {
        fs::rename(path, rotated_path(path))?;
    }

    Ok(File::create(path)?)
}

/// Path the previous run's log is moved to.
pub fn rotated_path(path: &Path) -> PathBuf {
    let mut rotated = OsString::from(path.as_os_str());
    rotated.push(".1");
    PathBuf::from(rotated)
}

/// Run logger for structured logging with consistent formatting.
///
/// Every line carries the run ID and the date being processed, so the lines
/// of one run can be picked out of a long-lived log file.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    date: String,
}

impl RunLogger {
    /// Create a new run logger.
    pub fn new(run_id: &RunId, date: NaiveDate) -> Self {
        Self {
            run_id: run_id.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn log_start(&self) {
        info!(run_id = %self.run_id, date = %self.date, "=== Video generation run started ===");
        info!(run_id = %self.run_id, "Processing date: {}", self.date);
    }

    pub fn log_category_start(&self, category: Category) {
        info!(
            run_id = %self.run_id,
            category = %category,
            "Generating video for category '{}'", category
        );
    }

    pub fn log_category_success(&self, category: Category) {
        info!(
            run_id = %self.run_id,
            category = %category,
            "Video generated for category '{}'", category
        );
    }

    /// Log a failed category request, including the response body verbatim.
    pub fn log_category_failure(&self, category: Category, err: &ClientError) {
        match err {
            ClientError::RequestFailed { status, body } => {
                error!(
                    run_id = %self.run_id,
                    category = %category,
                    "Video generation failed for category '{}': HTTP {}", category, status.as_u16()
                );
                error!(run_id = %self.run_id, "Response body: {}", body);
            }
            ClientError::Network(_) if err.is_timeout() => {
                error!(
                    run_id = %self.run_id,
                    category = %category,
                    "Request for category '{}' timed out: {}", category, err
                );
            }
            ClientError::Network(e) => {
                error!(
                    run_id = %self.run_id,
                    category = %category,
                    "Request for category '{}' failed: {}", category, e
                );
            }
        }
    }

    /// Log the outcome of the category phase.
    pub fn log_generation_summary(&self, succeeded: usize, total: usize, failed: &[Category]) {
        info!(run_id = %self.run_id, "Video generation finished: {}/{} succeeded", succeeded, total);
        if !failed.is_empty() {
            let names: Vec<&str> = failed.iter().map(|c| c.label()).collect();
            warn!(run_id = %self.run_id, "Failed categories: {}", names.join(", "));
        }
    }

    pub fn log_sync_start(&self) {
        info!(run_id = %self.run_id, "Starting file sync");
    }

    pub fn log_sync_success(&self, output: &SyncOutput) {
        info!(run_id = %self.run_id, "File sync succeeded");
        info!(run_id = %self.run_id, "rsync output: {}", output.stdout);
        if !output.stderr.trim().is_empty() {
            warn!(run_id = %self.run_id, "rsync warnings: {}", output.stderr.trim());
        }
    }

    /// Log a failed sync. Each failure mode gets its own message.
    pub fn log_sync_failure(&self, err: &SyncError) {
        match err {
            SyncError::Timeout(secs) => {
                error!(run_id = %self.run_id, timeout_secs = *secs, "File sync timed out");
            }
            SyncError::Failed { exit_code, stderr } => {
                error!(
                    run_id = %self.run_id,
                    exit_code = ?exit_code,
                    "File sync failed: {}", stderr
                );
            }
            SyncError::RsyncNotFound(_) | SyncError::Spawn(_) => {
                error!(run_id = %self.run_id, "File sync error: {}", err);
            }
        }
    }

    /// Log the final report.
    pub fn log_completion(&self, report: &RunReport) {
        if report.sync.is_success() {
            info!(run_id = %self.run_id, "All tasks finished");
        } else {
            error!(run_id = %self.run_id, "Sync did not complete, video generation already finished");
        }
        let failed: Vec<&str> = report.failed_categories().iter().map(|c| c.label()).collect();
        info!(
            run_id = %self.run_id,
            success = report.is_success(),
            succeeded = report.succeeded_count(),
            failed = %failed.join(","),
            "=== Video generation run finished ==="
        );
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id, date = %self.date)
    }
}
