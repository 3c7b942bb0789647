//! compiler.rs - Compiles and caches quick-replacement patterns.
//!
//! Every quick-replacement token is a regex fragment. The tokens of one
//! sanitizer are joined into a single alternation so that the quick pass is
//! one regex engine pass per segment. Compiled patterns are kept in a global,
//! shared cache keyed by the ordered token list, so cloned sanitizers and
//! repeated presets never recompile.
//!
//! License: MIT OR APACHE 2.0

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use crate::config::MAX_PATTERN_LENGTH;
use crate::errors::PathsafeError;

lazy_static! {
    /// A thread-safe, global cache for compiled quick patterns.
    /// The key is a hash of the ordered token list.
    static ref QUICK_PATTERN_CACHE: RwLock<HashMap<u64, Arc<Regex>>> = RwLock::new(HashMap::new());
}

fn hash_tokens(tokens: &[String]) -> u64 {
    let mut hasher = DefaultHasher::new();
    tokens.hash(&mut hasher);
    hasher.finish()
}

/// Builds the alternation source for a token list, wrapping each token in a
/// non-capturing group so that alternations inside tokens stay local.
pub fn alternation_source(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| format!("(?:{})", t))
        .collect::<Vec<_>>()
        .join("|")
}

/// Compiles a token list into a single alternation regex.
///
/// Returns `Ok(None)` for an empty list: the quick pass is then a no-op.
/// Each token is checked on its own first so that errors name the offending token.
pub fn compile_quick_pattern(tokens: &[String]) -> Result<Option<Regex>, PathsafeError> {
    if tokens.is_empty() {
        debug!("No quick replacements configured; quick pass disabled.");
        return Ok(None);
    }

    debug!("Starting compilation of {} quick replacement tokens.", tokens.len());

    for token in tokens {
        if token.len() > MAX_PATTERN_LENGTH {
            return Err(PathsafeError::PatternLengthExceeded(
                token.clone(),
                token.len(),
                MAX_PATTERN_LENGTH,
            ));
        }
        if let Err(e) = Regex::new(token) {
            return Err(PathsafeError::QuickPatternCompile(token.clone(), e));
        }
    }

    let source = alternation_source(tokens);
    let regex = RegexBuilder::new(&source)
        .size_limit(10 * (1 << 20)) // 10 MB limit for compiled regex
        .build()
        .map_err(|e| PathsafeError::QuickPatternCompile(source.clone(), e))?;

    log::debug!(
        target: "pathsafe_core::compiler",
        "Quick pattern compiled successfully: '{}'",
        source
    );
    Ok(Some(regex))
}

/// Gets a compiled quick pattern from the cache or compiles it if not found.
pub fn get_or_compile_quick_pattern(tokens: &[String]) -> Result<Option<Arc<Regex>>, PathsafeError> {
    if tokens.is_empty() {
        return Ok(None);
    }
    let cache_key = hash_tokens(tokens);

    {
        let cache = QUICK_PATTERN_CACHE.read().unwrap_or_else(|poisoned| {
            warn!("Quick pattern cache lock was poisoned; continuing with its contents.");
            poisoned.into_inner()
        });
        if let Some(pattern) = cache.get(&cache_key) {
            debug!("Serving quick pattern from cache for key: {}", cache_key);
            return Ok(Some(Arc::clone(pattern)));
        }
    }

    debug!("Quick pattern not found in cache. Compiling now.");
    let Some(compiled) = compile_quick_pattern(tokens)? else {
        return Ok(None);
    };
    let compiled = Arc::new(compiled);

    QUICK_PATTERN_CACHE
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(cache_key, Arc::clone(&compiled));

    debug!("Successfully compiled and cached quick pattern for key: {}", cache_key);
    Ok(Some(compiled))
}
