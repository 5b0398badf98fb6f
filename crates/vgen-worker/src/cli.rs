//! Command-line interface.

use clap::{CommandFactory, Parser};

use crate::config::WorkerConfig;
use crate::error::WorkerResult;

/// Daily price video generator: requests one video per product category,
/// then mirrors the output directory to the web host.
#[derive(Debug, Parser)]
#[command(name = "vgen-worker", version, long_about = None, disable_help_flag = true)]
pub struct Cli {
    /// Run the job once immediately and exit (0 = all succeeded, 1 = any failure)
    #[arg(long)]
    pub run_once: bool,

    /// Print usage and the effective configuration
    #[arg(short, long)]
    pub help: bool,
}

/// What the process should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Persistent daily scheduler
    Scheduler,
    /// One immediate run
    RunOnce,
    /// Print help and exit
    Help,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.help {
            Mode::Help
        } else if self.run_once {
            Mode::RunOnce
        } else {
            Mode::Scheduler
        }
    }
}

/// Usage text followed by the effective configuration.
pub fn render_help(config: &WorkerResult<WorkerConfig>) -> String {
    let mut out = Cli::command().render_help().to_string();
    out.push_str("\nEffective configuration (environment / .env):\n");

    match config {
        Ok(config) => {
            for (key, value) in config.describe() {
                out.push_str(&format!("  {:<20} {}\n", key, value));
            }
        }
        Err(e) => {
            out.push_str(&format!("  {}\n", e));
        }
    }

    out
}
