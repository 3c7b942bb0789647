//! Joins the root and sanitized segments back into one path.

use log::debug;

use crate::config::SanitizerConfig;
use crate::sanitized_path::SanitizedPath;
use crate::sanitizers::root::PathRoot;
use crate::sanitizers::segmenter::Segment;
use crate::validators::{is_valid_directory, is_valid_file_path, TargetOs};

/// Joins `segments` (already content-sanitized) behind `root`.
///
/// Blank text segments are skipped together with their separator. A
/// placeholder emits the separator unless the output is still empty or
/// already ends with it: runs of placeholders never stack up separators, and
/// only a root can put a separator at the front.
pub fn reassemble(
    root: Option<PathRoot>,
    segments: &[Segment],
    config: &SanitizerConfig,
) -> SanitizedPath {
    let separator = config.fixed_separator.as_str();
    let mut path = root.as_ref().map(|r| r.as_str().to_string()).unwrap_or_default();
    let mut kept = Vec::new();

    for segment in segments {
        match segment {
            Segment::Placeholder => {
                if !path.is_empty() && !path.ends_with(separator) {
                    path.push_str(separator);
                }
            }
            Segment::Text(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                if !path.is_empty() && !path.ends_with(separator) {
                    path.push_str(separator);
                }
                path.push_str(text);
                kept.push(text.clone());
            }
        }
    }

    // A path of separators only collapses to nothing; a drive root is still a root.
    let mut root = root;
    if config.remove_redundant_separators
        && kept.is_empty()
        && root.as_ref().is_some_and(PathRoot::is_separator)
    {
        debug!(target: "pathsafe_core::reassembler", "Only separators survived; result is empty.");
        root = None;
        path.clear();
    }

    let mut qualified = false;
    if config.fully_qualify {
        if let Some(absolute) = qualify(&path) {
            path = absolute;
            qualified = true;
        }
    }

    SanitizedPath {
        path,
        root: root.map(|r| r.as_str().to_string()),
        segments: kept,
        qualified,
    }
}

/// Resolves `path` against the working directory if it is a well-formed
/// file path or directory for the host. Any failure leaves it untouched.
fn qualify(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let os = TargetOs::host();
    if !is_valid_file_path(path, os, false) && !is_valid_directory(path, os, false) {
        debug!(target: "pathsafe_core::reassembler", "'{}' is not a valid path; left relative.", path);
        return None;
    }
    match std::path::absolute(path) {
        Ok(absolute) => Some(absolute.to_string_lossy().into_owned()),
        Err(e) => {
            debug!(target: "pathsafe_core::reassembler", "Could not qualify '{}': {}", path, e);
            None
        }
    }
}
