// File: pathsafe-core/src/builder.rs
//! Staged construction of a `PathSanitizer`.
//!
//! Policies and replacements are collected on the builder and compiled once
//! in [`PathSanitizerBuilder::build`], so a sanitizer is never observed with
//! a pattern that does not match its token list.
//!
//! License: MIT OR APACHE 2.0

use crate::config::{ReplacementMode, RootMode, SanitizerConfig};
use crate::engines::path_engine::PathSanitizer;
use crate::errors::PathsafeError;

#[derive(Debug, Clone, Default)]
pub struct PathSanitizerBuilder {
    config: SanitizerConfig,
}

impl PathSanitizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. a loaded preset.
    pub fn from_config(config: SanitizerConfig) -> Self {
        Self { config }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn fixed_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.fixed_separator = separator.into();
        self
    }

    /// Replaces the list of alternate separator spellings.
    pub fn possible_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.possible_separators = separators.into_iter().map(Into::into).collect();
        self
    }

    pub fn root_mode(mut self, mode: RootMode) -> Self {
        self.config.root_mode = mode;
        self
    }

    pub fn replacement_mode(mut self, mode: ReplacementMode) -> Self {
        self.config.replacement_mode = mode;
        self
    }

    pub fn remove_redundant_separators(mut self, remove: bool) -> Self {
        self.config.remove_redundant_separators = remove;
        self
    }

    pub fn force_root_separator(mut self, force: bool) -> Self {
        self.config.force_root_separator = force;
        self
    }

    pub fn fully_qualify(mut self, qualify: bool) -> Self {
        self.config.fully_qualify = qualify;
        self
    }

    pub fn auto_rebuild_quick_replacements(mut self, auto: bool) -> Self {
        self.config.auto_rebuild_quick_replacements = auto;
        self
    }

    pub fn quick_replacement(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        if !self.config.quick_replacements.contains(&token) {
            self.config.quick_replacements.push(token);
        }
        self
    }

    pub fn quick_replacements<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        tokens.into_iter().fold(self, |b, t| b.quick_replacement(t))
    }

    /// Adds an exact replacement; a repeated `from` overrides the earlier target.
    pub fn exact_replacement(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.config.upsert_exact(from, to);
        self
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Compiles the staged quick replacements and produces the sanitizer.
    pub fn build(self) -> Result<PathSanitizer, PathsafeError> {
        if self
            .config
            .exact_replacements
            .iter()
            .any(|pair| pair.from.is_empty())
        {
            return Err(PathsafeError::InvalidConfig(
                "exact replacements need a non-empty `from`".to_string(),
            ));
        }
        PathSanitizer::new(self.config)
    }
}
