//! `fortune-roulette` - New Year's fortune wheel

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use clap::Parser;
use tokio_util::sync::CancellationToken;

use fortune_roulette::cli::args::{Cli, OutputFormat};
use fortune_roulette::cli::commands;
use fortune_roulette::error::ExitCode;
use fortune_roulette::observability::{LogFormat, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        let format = match cli.log_format {
            OutputFormat::Human => LogFormat::Human,
            OutputFormat::Json => LogFormat::Json,
        };
        init_logging(format, cli.verbose, cli.color);
    }

    let cancel = CancellationToken::new();
    let signal_code = Arc::new(AtomicI32::new(ExitCode::SUCCESS));

    // First signal cancels the running command, a second one exits at once
    tokio::spawn(handle_signals(cancel.clone(), Arc::clone(&signal_code)));

    let result = commands::dispatch(cli, cancel).await;

    let interrupted = signal_code.load(Ordering::SeqCst);
    if interrupted != ExitCode::SUCCESS {
        std::process::exit(interrupted);
    }

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

#[cfg(unix)]
async fn handle_signals(cancel: CancellationToken, code: Arc<AtomicI32>) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!(error = %e, "failed to register SIGTERM handler");
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt(&cancel, &code, ExitCode::INTERRUPTED);
                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(ExitCode::INTERRUPTED);
                }
            }
            return;
        }
    };

    let first = tokio::select! {
        _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
        _ = sigterm.recv() => ExitCode::TERMINATED,
    };
    interrupt(&cancel, &code, first);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
        _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
    }
}

#[cfg(not(unix))]
async fn handle_signals(cancel: CancellationToken, code: Arc<AtomicI32>) {
    if tokio::signal::ctrl_c().await.is_ok() {
        interrupt(&cancel, &code, ExitCode::INTERRUPTED);
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(ExitCode::INTERRUPTED);
        }
    }
}

fn interrupt(cancel: &CancellationToken, code: &AtomicI32, exit_code: i32) {
    eprintln!("\nStopping... (press Ctrl+C again to force)");
    code.store(exit_code, Ordering::SeqCst);
    cancel.cancel();
}
