// pathsafe-core/src/lib.rs
//! # Pathsafe Core Library
//!
//! `pathsafe-core` turns arbitrary path strings into paths that are legal under a
//! chosen filesystem convention, and mutates files behind a temporary backup that
//! is restored if the mutation fails.
//!
//! The sanitizer is pure: it never touches the filesystem (except for the optional
//! full-qualification step, which only reads the working directory). The safe file
//! operations are an independent pipeline that is typically fed paths the sanitizer
//! has already normalized.
//!
//! ## Modules
//!
//! * `config`: `SanitizerConfig`, the root and replacement policies, built-in presets.
//! * `sanitizers`: the pipeline stages (segmenter, root classifier, content passes,
//!   reassembler) and the quick-pattern compiler and cache.
//! * `engine`: the `SanitizationEngine` trait.
//! * `engines`: `PathSanitizer`, the concrete engine.
//! * `builder`: `PathSanitizerBuilder` for staged construction.
//! * `sanitized_path`: the detailed result of one run.
//! * `validators`: filename, directory and file path grammars for Windows and Unix.
//! * `fileops`: plain primitives and the backup-guarded safe operations.
//! * `headless`: one-shot helpers.
//! * `errors`: `PathsafeError`.
//!
//! ## Usage Example
//!
//! ```rust
//! use pathsafe_core::{PathSanitizer, SanitizationEngine};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let sanitizer = PathSanitizer::universal()?;
//!     let cleaned = sanitizer.sanitize(r"C:\reports\q1<draft>?.txt")?;
//!     assert_eq!(cleaned, "C:/reports/q1draft.txt");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Sanitization and the safe file operations return `PathsafeError`. Loading
//! configuration files and presets returns `anyhow::Result` with context attached.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod builder;
pub mod config;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod fileops;
pub mod headless;
pub mod sanitized_path;
pub mod sanitizers;
pub mod validators;

/// Re-exports the configuration types and functions.
pub use config::{
    merge_configs,
    ConfigOverrides,
    ExactReplacement,
    PresetNotFoundError,
    ReplacementMode,
    RootMode,
    SanitizerConfig,
    MAX_PATTERN_LENGTH,
};

pub use errors::PathsafeError;

pub use engine::SanitizationEngine;
pub use engines::path_engine::PathSanitizer;
pub use builder::PathSanitizerBuilder;
pub use sanitized_path::SanitizedPath;

pub use validators::{is_valid_directory, is_valid_file_path, is_valid_filename, TargetOs};

/// Re-exports the plain and safe file operations.
pub use fileops::encoding::{TextEncoding, LINE_ENDING};
pub use fileops::plain::{AsyncFileOps, FileOps, StdFileOps, TokioFileOps};
pub use fileops::safe::{
    safe_append_bytes,
    safe_append_bytes_async,
    safe_append_string,
    safe_append_string_async,
    safe_append_strings,
    safe_append_strings_async,
    safe_copy,
    safe_copy_async,
    safe_move,
    safe_move_async,
    with_backup,
    with_backup_async,
    AsyncSafeFileManager,
    SafeFileManager,
    SafeOptions,
};

pub use headless::{headless_sanitize_path, headless_sanitize_with_config, HeadlessPreset};

pub use sanitizers::compiler::{compile_quick_pattern, get_or_compile_quick_pattern};

/// Re-exported so callers of the async operations need not depend on `tokio-util` directly.
pub use tokio_util::sync::CancellationToken;
