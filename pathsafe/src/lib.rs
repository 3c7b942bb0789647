// pathsafe/src/lib.rs
//! Library half of the `pathsafe` binary.
//!
//! The binary is a thin shell over `pathsafe-core`: argument parsing lives in
//! [`cli`], each subcommand in [`commands`], and stderr formatting in [`ui`].
//! Exposing them as a library lets the integration tests drive commands
//! without spawning a process.
//! License: MIT OR Apache-2.0

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
