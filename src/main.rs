//! `breathpacer` - guided breathing pacer

use clap::Parser;
use tokio_util::sync::CancellationToken;

use breathpacer::cli::args::Cli;
use breathpacer::cli::commands;
use breathpacer::error::ExitCode;
use breathpacer::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    let cancel = CancellationToken::new();

    // First signal ends the session gracefully, a second one forces exit.
    tokio::spawn(handle_signals(cancel.clone()));

    match commands::dispatch(cli, cancel).await {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

#[cfg(unix)]
async fn handle_signals(cancel: CancellationToken) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!(error = %e, "failed to register SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            cancel.cancel();
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }

    eprintln!("\nStopping session... (press Ctrl+C again to force)");
    cancel.cancel();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
        _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
    }
}

#[cfg(not(unix))]
async fn handle_signals(cancel: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    eprintln!("\nStopping session... (press Ctrl+C again to force)");
    cancel.cancel();

    let _ = tokio::signal::ctrl_c().await;
    std::process::exit(ExitCode::INTERRUPTED);
}
