//! Worker configuration.
//!
//! Built once at startup from the environment (and `.env`, loaded by the
//! binaries) and shared read-only afterwards.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;
use url::Url;

use vgen_api_client::{VideoApiConfig, DEFAULT_API_URL};
use vgen_models::DEFAULT_REGION;
use vgen_sync::SshCredentials;

use crate::error::{WorkerError, WorkerResult};

const DEFAULT_RSYNC_SOURCE: &str = "/root/code/price-data/data/output";
const DEFAULT_RSYNC_DEST: &str = "root@112.126.78.105:~/web/x";
const DEFAULT_SSH_KEY_PATH: &str = "/root/.ssh/id_rsa";
const DEFAULT_SCHEDULE_TIME: &str = "14:00";
const DEFAULT_LOG_FILE: &str = "logs/video_generator.log";

/// Log sink settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// File sink, rotated to `<file>.1` on every start
    pub file: PathBuf,
    /// Emit JSON lines instead of text
    pub json: bool,
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Video generation endpoint
    pub api_url: String,
    /// Per-request timeout
    pub api_timeout: Duration,
    /// Region prefix for video titles
    pub region: String,
    /// rsync binary
    pub rsync_bin: String,
    /// Local directory to mirror
    pub rsync_source: String,
    /// Remote destination, `user@host:path`
    pub rsync_dest: String,
    /// Identity file for ssh
    pub ssh_key_path: PathBuf,
    /// rsync timeout
    pub rsync_timeout: Duration,
    /// Local time of day for the daily run
    pub schedule_time: NaiveTime,
    /// How often the scheduler checks the clock
    pub poll_interval: Duration,
    pub log: LogConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_timeout: Duration::from_secs(300),
            region: DEFAULT_REGION.to_string(),
            rsync_bin: "rsync".to_string(),
            rsync_source: DEFAULT_RSYNC_SOURCE.to_string(),
            rsync_dest: DEFAULT_RSYNC_DEST.to_string(),
            ssh_key_path: PathBuf::from(DEFAULT_SSH_KEY_PATH),
            rsync_timeout: Duration::from_secs(600), // 10 minutes
            schedule_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default(),
            poll_interval: Duration::from_secs(60),
            log: LogConfig {
                file: PathBuf::from(DEFAULT_LOG_FILE),
                json: false,
            },
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = |key: &str, default: u64| {
            Duration::from_secs(
                lookup(key)
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(default),
            )
        };
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let home = lookup("HOME");
        let local_path = |key: &str, default: &str| expand_home(&string(key, default), home.as_deref());

        let api_url = string("API_URL", DEFAULT_API_URL);
        Url::parse(&api_url)
            .map_err(|e| WorkerError::config_error(format!("API_URL '{}': {}", api_url, e)))?;

        let schedule_time = parse_schedule_time(&string("SCHEDULE_TIME", DEFAULT_SCHEDULE_TIME))?;

        Ok(Self {
            api_url,
            api_timeout: secs("API_TIMEOUT_SECS", 300),
            region: string("VIDEO_REGION", DEFAULT_REGION),
            rsync_bin: string("RSYNC_BIN", "rsync"),
            rsync_source: local_path("RSYNC_SOURCE", DEFAULT_RSYNC_SOURCE),
            rsync_dest: string("RSYNC_DEST", DEFAULT_RSYNC_DEST),
            ssh_key_path: PathBuf::from(local_path("SSH_KEY_PATH", DEFAULT_SSH_KEY_PATH)),
            rsync_timeout: secs("RSYNC_TIMEOUT_SECS", 600),
            schedule_time,
            poll_interval: secs("SCHEDULER_POLL_SECS", 60).max(Duration::from_secs(1)),
            log: LogConfig {
                file: PathBuf::from(local_path("LOG_FILE", DEFAULT_LOG_FILE)),
                json: lookup("LOG_FORMAT")
                    .map(|v| v.to_lowercase() == "json")
                    .unwrap_or(false),
            },
        })
    }

    /// Settings for the video API client.
    pub fn api_config(&self) -> VideoApiConfig {
        VideoApiConfig {
            url: self.api_url.clone(),
            timeout: self.api_timeout,
        }
    }

    /// Credentials for the rsync remote shell.
    pub fn credentials(&self) -> SshCredentials {
        SshCredentials::unattended(&self.ssh_key_path)
    }

    /// Effective settings as `(variable, value)` pairs, for display.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("API_URL", self.api_url.clone()),
            ("API_TIMEOUT_SECS", self.api_timeout.as_secs().to_string()),
            ("VIDEO_REGION", self.region.clone()),
            ("RSYNC_BIN", self.rsync_bin.clone()),
            ("RSYNC_SOURCE", self.rsync_source.clone()),
            ("RSYNC_DEST", self.rsync_dest.clone()),
            ("SSH_KEY_PATH", self.ssh_key_path.display().to_string()),
            ("RSYNC_TIMEOUT_SECS", self.rsync_timeout.as_secs().to_string()),
            ("SCHEDULE_TIME", self.schedule_time.format("%H:%M").to_string()),
            ("SCHEDULER_POLL_SECS", self.poll_interval.as_secs().to_string()),
            ("LOG_FILE", self.log.file.display().to_string()),
            ("LOG_FORMAT", if self.log.json { "json" } else { "text" }.to_string()),
        ]
    }
}

/// Parse an `HH:MM` local time of day.
pub fn parse_schedule_time(value: &str) -> WorkerResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| {
        WorkerError::config_error(format!("SCHEDULE_TIME '{}' is not HH:MM: {}", value, e))
    })
}

/// Expand a leading `~` or `~/` to `home`. Local paths are read by the
/// worker itself, so no shell does this for them.
fn expand_home(path: &str, home: Option<&str>) -> String {
    match (path.strip_prefix('~'), home) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{}", home.trim_end_matches('/'), rest)
        }
        _ => path.to_string(),
    }
}
