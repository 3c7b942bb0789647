//! Configuration management for `pathsafe-core`.
//!
//! This module defines the core data structures for sanitizer configurations:
//! the separator convention, the root and replacement policies, and the two
//! replacement collections. It handles YAML (de)serialization and provides
//! utilities for loading the built-in presets, loading user files, merging
//! them, and validating quick-replacement tokens.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Maximum allowed length for a single quick-replacement token.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// How the root of a path is detected and kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootMode {
    /// Keep both drive roots (`C:/`) and separator roots (`/`).
    #[default]
    AllowAllRoots,
    /// Discard drive prefixes; only a leading separator counts as a root.
    SeparatorOnly,
    /// Strip every kind of root and always report a relative path.
    RemoveAllRoots,
}

/// Which content passes run on each segment, and in which order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementMode {
    #[default]
    QuickOnly,
    ExactOnly,
    QuickThenExact,
    ExactThenQuick,
}

impl fmt::Display for RootMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RootMode::AllowAllRoots => "allow_all_roots",
            RootMode::SeparatorOnly => "separator_only",
            RootMode::RemoveAllRoots => "remove_all_roots",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ReplacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReplacementMode::QuickOnly => "quick_only",
            ReplacementMode::ExactOnly => "exact_only",
            ReplacementMode::QuickThenExact => "quick_then_exact",
            ReplacementMode::ExactThenQuick => "exact_then_quick",
        };
        f.write_str(s)
    }
}

/// A single literal substitution, applied in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ExactReplacement {
    pub from: String,
    pub to: String,
}

impl ExactReplacement {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Represents the full configuration of a path sanitizer.
///
/// The compiled quick-replacement pattern is not part of the configuration;
/// it is derived from `quick_replacements` by the sanitizer itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Preset or profile name, informational only.
    pub name: String,
    /// The separator every recognized separator is normalized to. Empty deletes separators.
    pub fixed_separator: String,
    /// Alternate separator spellings treated as `fixed_separator`.
    pub possible_separators: Vec<String>,
    pub root_mode: RootMode,
    pub replacement_mode: ReplacementMode,
    /// Collapse consecutive and edge separators instead of keeping placeholders.
    pub remove_redundant_separators: bool,
    /// Synthesize a separator root when the input has none.
    pub force_root_separator: bool,
    /// Resolve valid results against the current working directory.
    pub fully_qualify: bool,
    /// Recompile the quick pattern on every add/remove.
    pub auto_rebuild_quick_replacements: bool,
    /// Regex fragments stripped from each segment in a single pass.
    pub quick_replacements: Vec<String>,
    /// Literal substitutions applied one pair at a time.
    pub exact_replacements: Vec<ExactReplacement>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            fixed_separator: "/".to_string(),
            possible_separators: vec!["\\".to_string()],
            root_mode: RootMode::AllowAllRoots,
            replacement_mode: ReplacementMode::QuickOnly,
            remove_redundant_separators: true,
            force_root_separator: false,
            fully_qualify: false,
            auto_rebuild_quick_replacements: true,
            quick_replacements: Vec::new(),
            exact_replacements: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PresetFile {
    presets: Vec<SanitizerConfig>,
}

/// Error type for unknown preset names.
#[derive(Debug)]
pub struct PresetNotFoundError {
    pub preset_name: String,
}

impl fmt::Display for PresetNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Sanitizer preset '{}' not found.", self.preset_name)
    }
}

impl std::error::Error for PresetNotFoundError {}

impl SanitizerConfig {
    /// Loads a sanitizer configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading sanitizer configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SanitizerConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        info!(
            "Loaded configuration with {} quick and {} exact replacements from {}.",
            config.quick_replacements.len(),
            config.exact_replacements.len(),
            path.display()
        );

        Ok(config)
    }

    /// Loads a built-in preset from the embedded preset file.
    pub fn load_preset(name: &str) -> Result<Self> {
        debug!("Loading preset '{}' from embedded string...", name);
        let presets = Self::load_presets()?;
        presets
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| {
                anyhow!(PresetNotFoundError {
                    preset_name: name.to_string(),
                })
            })
    }

    /// Loads every built-in preset.
    pub fn load_presets() -> Result<Vec<Self>> {
        let presets_yaml = include_str!("../config/presets.yaml");
        let file: PresetFile =
            serde_yml::from_str(presets_yaml).context("Failed to parse built-in presets")?;
        debug!("Loaded {} built-in presets.", file.presets.len());
        Ok(file.presets)
    }

    /// The strictest preset: legal on Windows, macOS and Linux alike.
    pub fn universal() -> Result<Self> {
        Self::load_preset("universal")
    }

    /// Only strips what a POSIX filesystem rejects; drive letters are discarded.
    pub fn posix() -> Result<Self> {
        Self::load_preset("posix")
    }

    /// Checks token lengths, token compilation and duplicate entries.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let mut seen_tokens = HashSet::new();
        for token in &self.quick_replacements {
            if token.is_empty() {
                errors.push("A quick replacement is empty.".to_string());
                continue;
            }
            if !seen_tokens.insert(token.as_str()) {
                warn!("Duplicate quick replacement '{}' will be ignored.", token);
            }
            if token.len() > MAX_PATTERN_LENGTH {
                errors.push(format!(
                    "Quick replacement '{}' is {} characters long; the maximum is {}.",
                    token,
                    token.len(),
                    MAX_PATTERN_LENGTH
                ));
                continue;
            }
            if let Err(e) = Regex::new(token) {
                errors.push(format!("Quick replacement '{}' is not a valid pattern: {}", token, e));
            }
        }

        let mut seen_exact = HashSet::new();
        for pair in &self.exact_replacements {
            if pair.from.is_empty() {
                errors.push(format!("An exact replacement to '{}' has an empty `from` field.", pair.to));
            } else if !seen_exact.insert(pair.from.as_str()) {
                errors.push(format!("Duplicate exact replacement for '{}'.", pair.from));
            }
        }

        if self.possible_separators.iter().any(|s| s.is_empty()) {
            errors.push("`possible_separators` contains an empty entry.".to_string());
        }

        if !errors.is_empty() {
            let full_error_message = format!("Configuration validation failed:\n{}", errors.join("\n"));
            Err(anyhow!(full_error_message))
        } else {
            Ok(())
        }
    }

    /// Inserts or overrides an exact replacement, keeping the original position of an overridden key.
    pub fn upsert_exact(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        let to = to.into();
        match self.exact_replacements.iter_mut().find(|p| p.from == from) {
            Some(existing) => existing.to = to,
            None => self.exact_replacements.push(ExactReplacement { from, to }),
        }
    }
}

/// A user configuration file layered over a preset.
///
/// Unlike [`SanitizerConfig`], every policy field is optional: a field the
/// file leaves out keeps the base value instead of falling back to the
/// default. Unknown keys are rejected so typos do not pass silently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub possible_separators: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_mode: Option<RootMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_mode: Option<ReplacementMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_redundant_separators: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_root_separator: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fully_qualify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_rebuild_quick_replacements: Option<bool>,
    /// Added to the base tokens.
    pub quick_replacements: Vec<String>,
    /// Upserted into the base pairs.
    pub exact_replacements: Vec<ExactReplacement>,
}

impl ConfigOverrides {
    /// Loads overrides from a YAML file and validates its replacements.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration overrides from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let overrides: ConfigOverrides = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        SanitizerConfig {
            quick_replacements: overrides.quick_replacements.clone(),
            exact_replacements: overrides.exact_replacements.clone(),
            ..Default::default()
        }
        .validate()
        .with_context(|| format!("Invalid replacements in {}", path.display()))?;

        Ok(overrides)
    }
}

/// A complete configuration overrides every field.
impl From<SanitizerConfig> for ConfigOverrides {
    fn from(config: SanitizerConfig) -> Self {
        Self {
            name: Some(config.name),
            fixed_separator: Some(config.fixed_separator),
            possible_separators: Some(config.possible_separators),
            root_mode: Some(config.root_mode),
            replacement_mode: Some(config.replacement_mode),
            remove_redundant_separators: Some(config.remove_redundant_separators),
            force_root_separator: Some(config.force_root_separator),
            fully_qualify: Some(config.fully_qualify),
            auto_rebuild_quick_replacements: Some(config.auto_rebuild_quick_replacements),
            quick_replacements: config.quick_replacements,
            exact_replacements: config.exact_replacements,
        }
    }
}

/// Merges user overrides over a base (usually a preset).
///
/// Only the policy fields the user actually set win. Quick tokens are unioned
/// with the base order first; exact pairs with the same `from` are overridden
/// in place and new ones are appended.
pub fn merge_configs(base: SanitizerConfig, user: Option<ConfigOverrides>) -> SanitizerConfig {
    let Some(user) = user else {
        debug!("merge_configs called without user overrides; using base '{}'.", base.name);
        return base;
    };

    debug!(
        "Merging user overrides ({} quick, {} exact) over base '{}' ({} quick, {} exact).",
        user.quick_replacements.len(),
        user.exact_replacements.len(),
        base.name,
        base.quick_replacements.len(),
        base.exact_replacements.len()
    );

    let mut merged = base;
    if let Some(name) = user.name.filter(|n| !n.is_empty()) {
        merged.name = name;
    }
    if let Some(separator) = user.fixed_separator {
        merged.fixed_separator = separator;
    }
    if let Some(separators) = user.possible_separators {
        merged.possible_separators = separators;
    }
    if let Some(mode) = user.root_mode {
        merged.root_mode = mode;
    }
    if let Some(mode) = user.replacement_mode {
        merged.replacement_mode = mode;
    }
    if let Some(flag) = user.remove_redundant_separators {
        merged.remove_redundant_separators = flag;
    }
    if let Some(flag) = user.force_root_separator {
        merged.force_root_separator = flag;
    }
    if let Some(flag) = user.fully_qualify {
        merged.fully_qualify = flag;
    }
    if let Some(flag) = user.auto_rebuild_quick_replacements {
        merged.auto_rebuild_quick_replacements = flag;
    }

    for token in user.quick_replacements {
        if !merged.quick_replacements.contains(&token) {
            merged.quick_replacements.push(token);
        }
    }
    for pair in user.exact_replacements {
        merged.upsert_exact(pair.from, pair.to);
    }

    debug!(
        "Final configuration after merge: {} quick, {} exact.",
        merged.quick_replacements.len(),
        merged.exact_replacements.len()
    );
    merged
}
