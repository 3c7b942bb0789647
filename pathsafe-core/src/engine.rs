// File: pathsafe-core/src/engine.rs
//! Defines the `SanitizationEngine` trait.
//!
//! The trait decouples callers (the CLI, the headless helpers) from the
//! concrete sanitizer so that a differently-configured or differently-built
//! engine can be swapped in behind a `Box<dyn SanitizationEngine>`.
//!
//! License: MIT OR APACHE 2.0

use crate::config::SanitizerConfig;
use crate::errors::PathsafeError;
use crate::sanitized_path::SanitizedPath;

/// A trait that defines the core functionality of a path sanitization engine.
///
/// Implementations must be shareable across threads: `sanitize` takes `&self`
/// and never mutates the engine.
pub trait SanitizationEngine: Send + Sync {
    /// Sanitizes `path`, returning only the resulting string.
    ///
    /// Fails with [`PathsafeError::EmptyPath`] for an empty input. Every other
    /// input produces a string, possibly empty.
    fn sanitize(&self, path: &str) -> Result<String, PathsafeError> {
        self.sanitize_detailed(path).map(SanitizedPath::into_string)
    }

    /// Sanitizes `path` and reports the root and segments it was built from.
    fn sanitize_detailed(&self, path: &str) -> Result<SanitizedPath, PathsafeError>;

    /// Returns a reference to the engine's configuration.
    fn config(&self) -> &SanitizerConfig;
}
