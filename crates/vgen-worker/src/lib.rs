//! Daily video generation worker.
//!
//! This crate provides:
//! - Environment-driven configuration
//! - The job runner (category requests, then one rsync)
//! - The once-a-day scheduler loop behind a pluggable clock
//! - Log setup with a file sink rotated on restart
//! - Signal handling: graceful stop, abort on a second signal

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;
pub mod scheduler;
pub mod shutdown;

pub use cli::{Cli, Mode};
pub use config::{LogConfig, WorkerConfig};
pub use error::{WorkerError, WorkerResult};
pub use logging::RunLogger;
pub use runner::JobRunner;
pub use scheduler::{Clock, DailyTrigger, Scheduler, SchedulerState, SystemClock};
