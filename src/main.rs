//! Dibs: advisory claims on shared remote environments.
//!
//! This is the main entry point for the `dibs` CLI. It parses arguments,
//! sets up logging, loads configuration, dispatches to the appropriate command
//! handler, and handles errors with proper exit codes.

mod catalog;
mod channel;
mod cli;
mod commands;
mod config;
mod coordinator;
mod error;
mod exit_codes;
mod identity;
mod locks;
mod readiness;
mod report;
mod select;

#[cfg(test)]
mod test_support;

use cli::Cli;
use config::Config;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    let result = Config::resolve(cli.config.as_deref())
        .and_then(|config| commands::dispatch(&config, cli.command));

    match result {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v` when set.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
