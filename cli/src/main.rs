//! hostwatch installer - provisions the hostwatch agent as a systemd service

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hostwatch_installer::cli::{Cli, RunOutcome, run_until_interrupted};

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr; RUST_LOG=debug shows every stage.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run_until_interrupted(cli.run(), shutdown_signal()).await {
        RunOutcome::Finished(Ok(())) => {}
        RunOutcome::Finished(Err(e)) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
        RunOutcome::Interrupted => {
            eprintln!("Error: interrupted; the install was left incomplete");
            std::process::exit(130);
        }
    }
}

/// Wait for SIGINT (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("received interrupt");
}
