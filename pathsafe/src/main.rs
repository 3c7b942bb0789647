// pathsafe/src/main.rs
//! Pathsafe entry point.
//!
//! Parses the command line, initialises logging and dispatches to the
//! subcommand. Exit codes: 0 on success, 1 on any failure, 2 when a rollback
//! failed and the target may be left in an intermediate state.

use anyhow::Result;
use clap::Parser;
use std::io;
use std::process::ExitCode;

use pathsafe::cli::{Cli, Commands};
use pathsafe::commands::{fileops, sanitize};
use pathsafe::logger;
use pathsafe::ui::output_format::{error_msg, warn_msg};
use pathsafe_core::{CancellationToken, PathsafeError};

/// Exit code for a failed rollback.
const EXIT_UNRECOVERABLE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    logger::init_logger(logger::level_from_flags(args.quiet, args.debug));

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn_msg("Interrupted; rolling back the current operation.");
            ctrl_c.cancel();
        }
    });

    match run(args.command, &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error_msg(format!("{:#}", e));
            match e.downcast_ref::<PathsafeError>() {
                Some(err) if err.is_unrecoverable() => ExitCode::from(EXIT_UNRECOVERABLE),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(command: Commands, cancel: &CancellationToken) -> Result<()> {
    match command {
        Commands::Sanitize(cmd) => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            sanitize::run_sanitize(&cmd, stdin.lock(), stdout.lock())
        }
        Commands::Append(cmd) => fileops::run_append(&cmd, cancel).await,
        Commands::Copy(cmd) => fileops::run_copy(&cmd, cancel).await,
        Commands::Move(cmd) => fileops::run_move(&cmd, cancel).await,
    }
}
