//! Root classification under the three root policies.

use log::debug;

use crate::config::{RootMode, SanitizerConfig};
use crate::sanitizers::segmenter::Segment;

/// The absolute anchor of a sanitized path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRoot {
    /// A leading or synthesized separator, e.g. `/`.
    Separator(String),
    /// A drive prefix followed by the separator, e.g. `C:/`.
    Drive(String),
}

impl PathRoot {
    pub fn as_str(&self) -> &str {
        match self {
            PathRoot::Separator(s) | PathRoot::Drive(s) => s,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, PathRoot::Separator(_))
    }
}

/// Output of the root classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootClassification {
    pub root: Option<PathRoot>,
    /// Index of the first segment the content passes may touch.
    pub first_index: usize,
}

impl RootClassification {
    fn none(first_index: usize) -> Self {
        Self {
            root: None,
            first_index,
        }
    }

    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }
}

/// Splits a lettered drive prefix (`C:`) off the front of a segment.
///
/// Only segments of at least two characters can carry a drive prefix.
pub fn split_drive_prefix(segment: &str) -> Option<(&str, &str)> {
    let mut chars = segment.chars();
    let letter = chars.next()?;
    let colon = chars.next()?;
    if letter.is_ascii_alphabetic() && colon == ':' {
        Some(segment.split_at(2))
    } else {
        None
    }
}

/// Classifies the root of `unified` and prepares `segments` for sanitization.
///
/// `segments` may be rewritten in place: drive prefixes are stripped from the
/// segment that carried them.
pub fn classify_root(
    segments: &mut [Segment],
    unified: &str,
    config: &SanitizerConfig,
) -> RootClassification {
    let separator = config.fixed_separator.as_str();
    let starts_with_separator = !separator.is_empty() && unified.starts_with(separator);

    let mut classification = match config.root_mode {
        RootMode::AllowAllRoots => allow_all_roots(segments, starts_with_separator, separator),
        RootMode::SeparatorOnly => separator_only(segments, unified, starts_with_separator, separator),
        RootMode::RemoveAllRoots => remove_all_roots(segments),
    };

    if classification.root.is_none() && config.force_root_separator {
        debug!(target: "pathsafe_core::root", "No root found; forcing separator root.");
        classification.root = Some(PathRoot::Separator(separator.to_string()));
    }

    debug!(
        target: "pathsafe_core::root",
        "Root of '{}' under {}: {:?}, sanitizing from segment {}.",
        unified,
        config.root_mode,
        classification.root,
        classification.first_index
    );
    classification
}

/// A leading separator root. The placeholder that stands for it, if any, is consumed.
fn separator_root(segments: &[Segment], separator: &str) -> RootClassification {
    let first_index = usize::from(matches!(segments.first(), Some(Segment::Placeholder)));
    RootClassification {
        root: Some(PathRoot::Separator(separator.to_string())),
        first_index,
    }
}

fn allow_all_roots(
    segments: &mut [Segment],
    starts_with_separator: bool,
    separator: &str,
) -> RootClassification {
    if starts_with_separator {
        return separator_root(segments, separator);
    }

    if let Some(Segment::Text(first)) = segments.first_mut() {
        if let Some((prefix, rest)) = split_drive_prefix(first) {
            let root = PathRoot::Drive(format!("{}{}", prefix, separator));
            let rest = rest.to_string();
            *first = rest;
            return RootClassification {
                root: Some(root),
                first_index: 0,
            };
        }
    }

    RootClassification::none(0)
}

fn separator_only(
    segments: &mut [Segment],
    unified: &str,
    starts_with_separator: bool,
    separator: &str,
) -> RootClassification {
    if starts_with_separator {
        return separator_root(segments, separator);
    }

    let Some(Segment::Text(first)) = segments.first_mut() else {
        return RootClassification::none(0);
    };
    let mut prefix_len = 0;
    while let Some((prefix, _)) = split_drive_prefix(&first[prefix_len..]) {
        debug!(target: "pathsafe_core::root", "Discarding drive prefix '{}'.", prefix);
        prefix_len += prefix.len();
    }
    if prefix_len == 0 {
        return RootClassification::none(0);
    }

    let drive_only = prefix_len == first.len();
    let mut first_index = 0;
    if drive_only {
        first_index = 1;
    } else {
        let rest = first[prefix_len..].to_string();
        *first = rest;
    }

    while matches!(segments.get(first_index), Some(Segment::Placeholder)) {
        first_index += 1;
    }

    // "C:/" and friends: once the drive is gone only the separator is left.
    let tail = &unified[prefix_len..];
    if drive_only
        && !separator.is_empty()
        && tail.starts_with(separator)
        && tail.split(separator).all(str::is_empty)
    {
        return RootClassification {
            root: Some(PathRoot::Separator(separator.to_string())),
            first_index,
        };
    }

    RootClassification::none(first_index)
}

fn remove_all_roots(segments: &mut [Segment]) -> RootClassification {
    let mut index = 0;
    while index < segments.len() {
        match &mut segments[index] {
            Segment::Placeholder => index += 1,
            Segment::Text(text) => {
                while let Some(rest) = split_drive_prefix(text).map(|(_, r)| r.to_string()) {
                    *text = rest;
                }
                if text.is_empty() {
                    index += 1;
                } else {
                    break;
                }
            }
        }
    }
    RootClassification::none(index)
}
