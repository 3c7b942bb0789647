// pathsafe/src/commands/sanitize.rs
//! The `sanitize` subcommand.
//!
//! Builds a [`SanitizerConfig`] from the chosen preset, an optional YAML
//! file merged over it, and finally the command-line overrides. Every input
//! is processed even when some fail; the command reports failure at the end.
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::io::{BufRead, Write};

use pathsafe_core::{
    merge_configs, ConfigOverrides, HeadlessPreset, PathSanitizer, PathsafeError, SanitizationEngine,
    SanitizerConfig,
};

use crate::cli::SanitizeCommand;
use crate::ui::output_format::warn_msg;

/// Resolves the effective configuration for `cmd`.
pub fn build_config(cmd: &SanitizeCommand) -> Result<SanitizerConfig> {
    let preset: HeadlessPreset = cmd.preset.into();
    let base = preset.load()?;

    let user = match &cmd.config {
        Some(path) => {
            info!("Loading sanitizer configuration from {}", path.display());
            Some(ConfigOverrides::load_from_file(path)?)
        }
        None => None,
    };
    let mut config = merge_configs(base, user);

    if let Some(mode) = cmd.root_mode {
        config.root_mode = mode.into();
    }
    if let Some(mode) = cmd.replacement_mode {
        config.replacement_mode = mode.into();
    }
    if cmd.keep_redundant {
        config.remove_redundant_separators = false;
    }
    if cmd.force_root {
        config.force_root_separator = true;
    }
    if cmd.fully_qualify {
        config.fully_qualify = true;
    }
    for token in &cmd.quick {
        if !config.quick_replacements.contains(token) {
            config.quick_replacements.push(token.clone());
        }
    }
    for (from, to) in &cmd.exact {
        config.upsert_exact(from.as_str(), to.as_str());
    }

    config.validate()?;
    debug!("Effective sanitizer configuration: {:?}", config);
    Ok(config)
}

/// Runs the command. Paths come from `cmd.paths`, or from `input` one per
/// line when none were given. Results go to `output`, one per line.
pub fn run_sanitize<R: BufRead, W: Write>(cmd: &SanitizeCommand, input: R, mut output: W) -> Result<()> {
    let config = build_config(cmd)?;
    let sanitizer = PathSanitizer::new(config).context("Failed to build the sanitizer")?;

    let inputs: Vec<String> = if cmd.paths.is_empty() {
        input
            .lines()
            .map(|line| line.map(|l| l.trim_end_matches('\r').to_string()))
            .collect::<std::io::Result<_>>()
            .context("Failed to read paths from stdin")?
    } else {
        cmd.paths.clone()
    };

    let mut failures = 0usize;
    for (index, raw) in inputs.iter().enumerate() {
        match sanitizer.sanitize(raw) {
            Ok(clean) => writeln!(output, "{}", clean)?,
            Err(PathsafeError::EmptyPath) => {
                failures += 1;
                warn_msg(format!("Input {} is empty and was skipped.", index + 1));
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to sanitize '{}'", raw)),
        }
    }
    output.flush()?;

    if failures > 0 {
        return Err(anyhow!("{} of {} inputs could not be sanitized", failures, inputs.len()));
    }
    Ok(())
}
