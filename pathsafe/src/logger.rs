// pathsafe/src/logger.rs
//! Logger initialisation for the pathsafe binary.
//!
//! `RUST_LOG` is honoured unless the command line forces a level with
//! `--quiet` or `--debug`. Logs go to stderr so that sanitized paths on
//! stdout stay machine-readable.
//! License: MIT OR Apache-2.0

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Default filter when neither `RUST_LOG` nor a flag says otherwise.
pub const DEFAULT_FILTER: &str = "warn";

/// Initialises `env_logger`. `level` overrides `RUST_LOG` when given.
///
/// Safe to call more than once: later calls are ignored.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.target(Target::Stderr).format_timestamp(None);
    if builder.try_init().is_err() {
        log::debug!("Logger already initialised; keeping the existing one.");
    }
}

/// The level implied by the global flags. `--quiet` wins over `--debug`.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}
