// pathsafe/src/commands/fileops.rs
//! The `append`, `move` and `copy` subcommands.
//!
//! All three go through [`AsyncSafeFileManager`], so an interrupted or failed
//! run leaves the target as it was before the command started.
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::debug;
use tokio::fs;

use pathsafe_core::{AsyncSafeFileManager, CancellationToken, SafeOptions, TextEncoding};

use crate::cli::{AppendCommand, TransferCommand};
use crate::ui::output_format::{info_msg, success_msg};

fn options(keep_backups: bool) -> SafeOptions {
    if keep_backups {
        SafeOptions::keep_backups()
    } else {
        SafeOptions::default()
    }
}

/// Bytes the `append` command will write, from `--text` or `--input`.
async fn payload(cmd: &AppendCommand) -> Result<Vec<u8>> {
    let encoding: TextEncoding = cmd.encoding.into();
    if let Some(text) = &cmd.text {
        return Ok(encoding.encode_lines([text.as_str()], cmd.newline));
    }
    let Some(input) = &cmd.input else {
        anyhow::bail!("append needs --text or --input");
    };
    let mut bytes = fs::read(input)
        .await
        .with_context(|| format!("Failed to read input file {}", input.display()))?;
    if cmd.newline {
        bytes.extend(encoding.encode(pathsafe_core::LINE_ENDING));
    }
    Ok(bytes)
}

pub async fn run_append(cmd: &AppendCommand, cancel: &CancellationToken) -> Result<()> {
    let bytes = payload(cmd).await?;
    debug!("Appending {} bytes to {} (create: {})", bytes.len(), cmd.target.display(), cmd.create);

    let manager = AsyncSafeFileManager::new().with_options(options(cmd.keep_backups));
    if cmd.keep_backups {
        info_msg("Backups will be kept in the system temp directory.");
    }
    manager
        .append_bytes(&cmd.target, &bytes, cmd.create, cancel)
        .await?;
    success_msg(format!("Appended {} bytes to {}", bytes.len(), cmd.target.display()));
    Ok(())
}

pub async fn run_copy(cmd: &TransferCommand, cancel: &CancellationToken) -> Result<()> {
    let manager = AsyncSafeFileManager::new().with_options(options(cmd.keep_backups));
    manager
        .copy(&cmd.source, &cmd.destination, cmd.overwrite, cancel)
        .await?;
    success_msg(format!(
        "Copied {} to {}",
        cmd.source.display(),
        cmd.destination.display()
    ));
    Ok(())
}

pub async fn run_move(cmd: &TransferCommand, cancel: &CancellationToken) -> Result<()> {
    let manager = AsyncSafeFileManager::new().with_options(options(cmd.keep_backups));
    manager
        .move_file(&cmd.source, &cmd.destination, cmd.overwrite, cancel)
        .await?;
    success_msg(format!(
        "Moved {} to {}",
        cmd.source.display(),
        cmd.destination.display()
    ));
    Ok(())
}
