//! Video generation worker binary.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use vgen_worker::cli::{self, Cli, Mode};
use vgen_worker::shutdown::{self, ABORT_EXIT_CODE};
use vgen_worker::{logging, JobRunner, Scheduler, SystemClock, WorkerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = WorkerConfig::from_env();

    if cli.mode() == Mode::Help {
        print!("{}", cli::render_help(&config));
        return ExitCode::SUCCESS;
    }

    let config = match config {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = logging::init_tracing(&config.log) {
        info!("Logging to {}", path.display());
    }
    info!("Worker config: {:?}", config);

    let runner = match JobRunner::from_config(Arc::clone(&config)) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to create job runner: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.mode() == Mode::RunOnce {
        let report = runner.run_once().await;
        return ExitCode::from(report.exit_code());
    }

    // Setup signal handlers
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    tokio::spawn(shutdown::forward_signals(signal_tx));
    tokio::spawn(async move {
        if shutdown::escalate_signals(signal_rx, shutdown_tx).await {
            std::process::exit(ABORT_EXIT_CODE);
        }
    });

    let mut scheduler = Scheduler::new(
        runner,
        SystemClock,
        config.schedule_time,
        config.poll_interval,
    );
    let runs = scheduler.run(shutdown_rx).await;

    info!(state = ?scheduler.state(), runs, "Worker shutdown complete");
    ExitCode::SUCCESS
}

