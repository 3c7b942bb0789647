//! errors.rs - Custom error types for the pathsafe-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//! Every filesystem failure inside the safe operations is converted into one
//! of these variants before it reaches the caller.
//!
//! License: MIT OR APACHE 2.0

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// This enum represents all possible error types in the `pathsafe-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PathsafeError {
    #[error("Cannot sanitize an empty path")]
    EmptyPath,

    #[error("Failed to compile quick replacement '{0}': {1}")]
    QuickPatternCompile(String, regex::Error),

    #[error("Quick replacement '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Invalid sanitizer configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not back up '{}' before mutating it: {source}", .target.display())]
    BackupUnavailable {
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Operation on '{}' failed and was rolled back: {source}", .target.display())]
    MutationFailed {
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Operation on '{}' was cancelled; the target was left in its prior state", .target.display())]
    Cancelled { target: PathBuf },

    #[error(
        "Rollback of '{}' failed after '{mutation}'; backup retained at '{}': {source}",
        .target.display(),
        display_backup(.backup)
    )]
    RollbackFailed {
        target: PathBuf,
        backup: Option<PathBuf>,
        mutation: String,
        #[source]
        source: io::Error,
    },

    #[error("Destination '{}' already exists and overwrite was not requested", .0.display())]
    DestinationExists(PathBuf),

    #[error("Source '{}' does not exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("An unexpected I/O error occurred: {0}")]
    Io(#[from] io::Error),
}

fn display_backup(backup: &Option<PathBuf>) -> String {
    backup
        .as_ref()
        .map(|b| b.display().to_string())
        .unwrap_or_else(|| "<none>".to_string())
}

impl PathsafeError {
    /// True only for a failed rollback: the target may be in neither its
    /// original nor its intended state.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, PathsafeError::RollbackFailed { .. })
    }

    /// True when the target was never touched.
    pub fn target_untouched(&self) -> bool {
        matches!(
            self,
            PathsafeError::BackupUnavailable { .. }
                | PathsafeError::DestinationExists(_)
                | PathsafeError::SourceMissing(_)
        )
    }
}

/// Result type for sanitization and safe file operations.
pub type Result<T> = std::result::Result<T, PathsafeError>;
