//! Separator unification and segmentation.

use log::debug;

use crate::config::SanitizerConfig;

/// One component of a path after splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Real content between two separators.
    Text(String),
    /// Stands for one preserved separator when redundancy removal is off.
    Placeholder,
}

impl Segment {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Segment::Placeholder)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Segment::Text(s) => Some(s),
            Segment::Placeholder => None,
        }
    }
}

/// Rewrites every alternate separator spelling to `fixed_separator`.
pub fn unify_separators(path: &str, config: &SanitizerConfig) -> String {
    let mut unified = path.to_string();
    for separator in &config.possible_separators {
        if separator.is_empty() || *separator == config.fixed_separator {
            continue;
        }
        unified = unified.replace(separator.as_str(), &config.fixed_separator);
    }
    unified
}

/// Splits an already unified path on `fixed_separator`.
///
/// With redundancy removal every empty piece is dropped, so an input made only
/// of separators yields no segments at all. Without it every empty piece
/// becomes a [`Segment::Placeholder`]. An empty separator never splits.
pub fn split_segments(unified: &str, config: &SanitizerConfig) -> Vec<Segment> {
    let separator = config.fixed_separator.as_str();
    if separator.is_empty() {
        return if unified.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Text(unified.to_string())]
        };
    }

    let segments: Vec<Segment> = if config.remove_redundant_separators {
        unified
            .split(separator)
            .filter(|piece| !piece.is_empty())
            .map(|piece| Segment::Text(piece.to_string()))
            .collect()
    } else {
        unified
            .split(separator)
            .map(|piece| {
                if piece.is_empty() {
                    Segment::Placeholder
                } else {
                    Segment::Text(piece.to_string())
                }
            })
            .collect()
    };

    debug!(
        target: "pathsafe_core::segmenter",
        "Split '{}' into {} segments (redundancy removal: {}).",
        unified,
        segments.len(),
        config.remove_redundant_separators
    );
    segments
}
