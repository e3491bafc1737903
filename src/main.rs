use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod cli;
mod commands;
mod config;
mod domain;
mod http;
mod metrics;
mod rpc;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let result = match cli.command {
        Command::Server(args) => {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting names server");
            commands::server::run(args.into()).await
        }
        Command::Client(args) => {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting names client");
            commands::client::run(args.into()).await
        }
        Command::Transform(args) => commands::transform::run(args.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Exiting with error");
            ExitCode::FAILURE
        }
    }
}

/// Structured logs on stderr. `RUST_LOG` wins over `--log-level` when set.
fn init_tracing(log_level: u8) {
    let default_level = match log_level {
        0 => "debug",
        1 => "info",
        2 => "warn",
        _ => "error",
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}
