// File: pathsafe-core/src/engines/path_engine.rs
//! A `SanitizationEngine` implementation that normalizes paths segment by segment.
//!
//! `PathSanitizer` owns a [`SanitizerConfig`] and the quick-replacement
//! pattern compiled from it. Sanitizing never mutates the sanitizer, so one
//! instance can be shared between threads; the replacement collections can
//! only be changed through `&mut self`.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use std::sync::Arc;

use crate::config::{ExactReplacement, SanitizerConfig};
use crate::engine::SanitizationEngine;
use crate::errors::PathsafeError;
use crate::sanitized_path::SanitizedPath;
use crate::sanitizers::compiler::get_or_compile_quick_pattern;
use crate::sanitizers::content::SegmentSanitizer;
use crate::sanitizers::reassembler::reassemble;
use crate::sanitizers::root::classify_root;
use crate::sanitizers::segmenter::{split_segments, unify_separators, Segment};

#[derive(Debug, Clone)]
pub struct PathSanitizer {
    config: SanitizerConfig,
    quick_pattern: Option<Arc<Regex>>,
    /// Set when the token list changed without a rebuild.
    pattern_stale: bool,
}

impl PathSanitizer {
    /// Builds a sanitizer from `config`, compiling its quick replacements.
    pub fn new(mut config: SanitizerConfig) -> Result<Self, PathsafeError> {
        dedup_in_order(&mut config.quick_replacements);
        let quick_pattern = get_or_compile_quick_pattern(&config.quick_replacements)?;
        debug!(
            "PathSanitizer '{}' ready: {} quick, {} exact, {} / {}.",
            config.name,
            config.quick_replacements.len(),
            config.exact_replacements.len(),
            config.root_mode,
            config.replacement_mode
        );
        Ok(Self {
            config,
            quick_pattern,
            pattern_stale: false,
        })
    }

    /// A sanitizer built from the `universal` preset.
    pub fn universal() -> Result<Self> {
        let config = SanitizerConfig::universal()?;
        Self::new(config).context("Failed to build the universal sanitizer")
    }

    /// A sanitizer built from the `posix` preset.
    pub fn posix() -> Result<Self> {
        let config = SanitizerConfig::posix()?;
        Self::new(config).context("Failed to build the posix sanitizer")
    }

    pub fn quick_replacements(&self) -> &[String] {
        &self.config.quick_replacements
    }

    pub fn exact_replacements(&self) -> &[ExactReplacement] {
        &self.config.exact_replacements
    }

    /// True when quick tokens were changed and the pattern was not rebuilt yet.
    pub fn is_pattern_stale(&self) -> bool {
        self.pattern_stale
    }

    /// Adds quick-replacement tokens, ignoring ones already present.
    ///
    /// With auto-rebuild on, the pattern is recompiled immediately and a token
    /// that fails to compile leaves the sanitizer unchanged.
    pub fn add_quick_replacements<I, S>(&mut self, tokens: I) -> Result<(), PathsafeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut updated = self.config.quick_replacements.clone();
        for token in tokens {
            let token = token.into();
            if !updated.contains(&token) {
                updated.push(token);
            }
        }
        self.replace_quick_tokens(updated)
    }

    /// Removes quick-replacement tokens. Unknown tokens are ignored.
    pub fn remove_quick_replacements<I, S>(&mut self, tokens: I) -> Result<(), PathsafeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let removed: Vec<S> = tokens.into_iter().collect();
        let updated: Vec<String> = self
            .config
            .quick_replacements
            .iter()
            .filter(|t| !removed.iter().any(|r| r.as_ref() == t.as_str()))
            .cloned()
            .collect();
        self.replace_quick_tokens(updated)
    }

    fn replace_quick_tokens(&mut self, tokens: Vec<String>) -> Result<(), PathsafeError> {
        if tokens == self.config.quick_replacements {
            return Ok(());
        }
        if self.config.auto_rebuild_quick_replacements {
            let pattern = get_or_compile_quick_pattern(&tokens)?;
            self.config.quick_replacements = tokens;
            self.quick_pattern = pattern;
            self.pattern_stale = false;
        } else {
            self.config.quick_replacements = tokens;
            self.pattern_stale = true;
        }
        Ok(())
    }

    /// Recompiles the quick pattern from the current token list.
    pub fn rebuild_quick_replacement_pattern(&mut self) -> Result<(), PathsafeError> {
        self.quick_pattern = get_or_compile_quick_pattern(&self.config.quick_replacements)?;
        self.pattern_stale = false;
        info!(
            "Rebuilt quick replacement pattern for '{}' from {} tokens.",
            self.config.name,
            self.config.quick_replacements.len()
        );
        Ok(())
    }

    /// Adds an exact replacement or overrides the target of an existing one.
    pub fn add_exact_replacement(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.config.upsert_exact(from, to);
    }

    /// Removes the exact replacement for `from`. Returns whether one existed.
    pub fn remove_exact_replacement(&mut self, from: &str) -> bool {
        let before = self.config.exact_replacements.len();
        self.config.exact_replacements.retain(|p| p.from != from);
        before != self.config.exact_replacements.len()
    }
}

impl SanitizationEngine for PathSanitizer {
    fn sanitize_detailed(&self, path: &str) -> Result<SanitizedPath, PathsafeError> {
        if path.is_empty() {
            return Err(PathsafeError::EmptyPath);
        }
        if self.pattern_stale {
            warn!(
                "Sanitizing with a stale quick pattern; call rebuild_quick_replacement_pattern after changing tokens."
            );
        }

        let config = &self.config;
        let unified = unify_separators(path, config);
        let mut segments = split_segments(&unified, config);
        let classification = classify_root(&mut segments, &unified, config);

        let segment_sanitizer = SegmentSanitizer::new(
            self.quick_pattern.as_deref(),
            &config.exact_replacements,
            config.replacement_mode,
        );
        let sanitized: Vec<Segment> = segments
            .iter()
            .skip(classification.first_index)
            .map(|segment| match segment {
                Segment::Placeholder => Segment::Placeholder,
                Segment::Text(text) => Segment::Text(segment_sanitizer.sanitize(text)),
            })
            .collect();

        let result = reassemble(classification.root, &sanitized, config);
        debug!(target: "pathsafe_core::engine", "Sanitized '{}' to '{}'.", path, result.path);
        Ok(result)
    }

    fn config(&self) -> &SanitizerConfig {
        &self.config
    }
}

fn dedup_in_order(tokens: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    tokens.retain(|t| seen.insert(t.clone()));
}
