// pathsafe/src/cli.rs
//! This file defines the command-line interface (CLI) for the pathsafe application,
//! including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use pathsafe_core::{HeadlessPreset, ReplacementMode, RootMode, TextEncoding};

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "pathsafe",
    author = "Obscura Team (Relay)",
    version = env!("CARGO_PKG_VERSION"),
    about = "Sanitize paths and mutate files behind an automatic backup",
    long_about = "Pathsafe rewrites arbitrary path strings into paths that are legal under a chosen filesystem convention, and appends to, copies or moves files while keeping a temporary backup that is restored if the operation fails or is interrupted.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `pathsafe` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitizes paths given as arguments or read line by line from stdin.
    #[command(about = "Sanitizes paths given as arguments or read line by line from stdin.")]
    Sanitize(SanitizeCommand),

    /// Appends text or the contents of a file to a target, with rollback on failure.
    #[command(about = "Appends text or file contents to a target, with rollback on failure.")]
    Append(AppendCommand),

    /// Moves a file, backing up the destination first.
    #[command(name = "move", about = "Moves a file, backing up the destination first.")]
    Move(TransferCommand),

    /// Copies a file, backing up the destination first.
    #[command(about = "Copies a file, backing up the destination first.")]
    Copy(TransferCommand),
}

/// Arguments for the `sanitize` command.
#[derive(Args, Debug, Default)]
pub struct SanitizeCommand {
    /// Paths to sanitize (reads newline-separated paths from stdin if none are given).
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Built-in preset used as the base configuration.
    #[arg(long, value_enum, default_value_t = PresetChoice::Universal, help = "Built-in preset used as the base configuration.")]
    pub preset: PresetChoice,

    /// Path to a custom sanitizer configuration file (YAML), merged over the preset.
    #[arg(long = "config", value_name = "FILE", help = "Path to a custom sanitizer configuration file (YAML), merged over the preset.")]
    pub config: Option<PathBuf>,

    #[arg(long = "root-mode", value_enum, help = "Override how drive and separator roots are handled.")]
    pub root_mode: Option<RootModeArg>,

    #[arg(long = "replacement-mode", value_enum, help = "Override which replacement passes run, and in which order.")]
    pub replacement_mode: Option<ReplacementModeArg>,

    /// Keep redundant separators instead of collapsing them.
    #[arg(long = "keep-redundant", help = "Keep redundant separators instead of collapsing them.")]
    pub keep_redundant: bool,

    #[arg(long = "force-root", help = "Add a separator root to paths that have none.")]
    pub force_root: bool,

    #[arg(long = "fully-qualify", help = "Resolve valid results against the current working directory.")]
    pub fully_qualify: bool,

    /// Extra quick-replacement tokens (regex fragments stripped from every segment).
    #[arg(long = "quick", value_name = "TOKEN", help = "Add a quick-replacement token (regex fragment stripped from every segment). Repeatable.")]
    pub quick: Vec<String>,

    /// Extra exact replacements in FROM=TO form.
    #[arg(long = "exact", value_name = "FROM=TO", value_parser = parse_exact_pair, help = "Add an exact replacement in FROM=TO form. Repeatable.")]
    pub exact: Vec<(String, String)>,
}

/// Arguments for the `append` command.
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("source").required(true).args(["text", "input"]))]
pub struct AppendCommand {
    /// File to append to.
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    #[arg(long, value_name = "TEXT", help = "Text to append.")]
    pub text: Option<String>,

    #[arg(long, short = 'i', value_name = "FILE", help = "Append the raw bytes of this file.")]
    pub input: Option<PathBuf>,

    #[arg(long, help = "Terminate the appended text with the platform line ending.")]
    pub newline: bool,

    #[arg(long, help = "Create the target if it does not exist.")]
    pub create: bool,

    #[arg(long, value_enum, default_value_t = EncodingArg::Utf8, help = "Encoding used for --text.")]
    pub encoding: EncodingArg,

    #[arg(long = "keep-backups", help = "Leave the temporary backup on disk after the operation.")]
    pub keep_backups: bool,
}

/// Arguments shared by the `move` and `copy` commands.
#[derive(Args, Debug)]
pub struct TransferCommand {
    #[arg(value_name = "SRC")]
    pub source: PathBuf,

    #[arg(value_name = "DST")]
    pub destination: PathBuf,

    #[arg(long, help = "Replace the destination if it already exists.")]
    pub overwrite: bool,

    #[arg(long = "keep-backups", help = "Leave the temporary backup on disk after the operation.")]
    pub keep_backups: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresetChoice {
    /// Legal on Windows, macOS and Linux alike.
    #[default]
    Universal,
    /// Only what a POSIX filesystem rejects; drive letters are dropped.
    Posix,
}

impl From<PresetChoice> for HeadlessPreset {
    fn from(choice: PresetChoice) -> Self {
        match choice {
            PresetChoice::Universal => HeadlessPreset::Universal,
            PresetChoice::Posix => HeadlessPreset::Posix,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootModeArg {
    AllowAll,
    SeparatorOnly,
    RemoveAll,
}

impl From<RootModeArg> for RootMode {
    fn from(arg: RootModeArg) -> Self {
        match arg {
            RootModeArg::AllowAll => RootMode::AllowAllRoots,
            RootModeArg::SeparatorOnly => RootMode::SeparatorOnly,
            RootModeArg::RemoveAll => RootMode::RemoveAllRoots,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementModeArg {
    QuickOnly,
    ExactOnly,
    QuickThenExact,
    ExactThenQuick,
}

impl From<ReplacementModeArg> for ReplacementMode {
    fn from(arg: ReplacementModeArg) -> Self {
        match arg {
            ReplacementModeArg::QuickOnly => ReplacementMode::QuickOnly,
            ReplacementModeArg::ExactOnly => ReplacementMode::ExactOnly,
            ReplacementModeArg::QuickThenExact => ReplacementMode::QuickThenExact,
            ReplacementModeArg::ExactThenQuick => ReplacementMode::ExactThenQuick,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingArg {
    #[default]
    Utf8,
    Utf16le,
    Utf16be,
}

impl From<EncodingArg> for TextEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Utf8 => TextEncoding::Utf8,
            EncodingArg::Utf16le => TextEncoding::Utf16Le,
            EncodingArg::Utf16be => TextEncoding::Utf16Be,
        }
    }
}

/// Parses `FROM=TO`. Only the first `=` splits, so `TO` may itself contain `=`.
pub fn parse_exact_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((from, _)) if from.is_empty() => Err(format!("'{}': FROM must not be empty", raw)),
        Some((from, to)) => Ok((from.to_string(), to.to_string())),
        None => Err(format!("'{}' is not in FROM=TO form", raw)),
    }
}
