// File: pathsafe-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for one-shot, non-interactive path sanitization.
//!
//! Callers that sanitize many paths should build a `PathSanitizer` once and
//! reuse it; these helpers build a fresh one per call.

use anyhow::{Context, Result};

use crate::config::SanitizerConfig;
use crate::engine::SanitizationEngine;
use crate::engines::path_engine::PathSanitizer;

/// Enum to select which built-in preset to use in headless mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadlessPreset {
    #[default]
    Universal,
    Posix,
}

impl HeadlessPreset {
    pub fn load(self) -> Result<SanitizerConfig> {
        match self {
            HeadlessPreset::Universal => SanitizerConfig::universal(),
            HeadlessPreset::Posix => SanitizerConfig::posix(),
        }
    }
}

/// Sanitizes `path` with one of the built-in presets.
pub fn headless_sanitize_path(preset: HeadlessPreset, path: &str) -> Result<String> {
    headless_sanitize_with_config(preset.load()?, path)
}

/// Sanitizes `path` with an arbitrary configuration.
pub fn headless_sanitize_with_config(config: SanitizerConfig, path: &str) -> Result<String> {
    let engine: Box<dyn SanitizationEngine> = Box::new(
        PathSanitizer::new(config).context("Failed to build sanitizer for headless use")?,
    );
    let sanitized = engine
        .sanitize(path)
        .with_context(|| format!("Failed to sanitize '{}'", path))?;
    Ok(sanitized)
}
