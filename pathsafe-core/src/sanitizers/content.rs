//! Per-segment content passes: quick strip, exact substitution, trimming.

use regex::Regex;

use crate::config::{ExactReplacement, ReplacementMode};

/// Applies the configured replacement passes to one segment at a time.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSanitizer<'a> {
    quick: Option<&'a Regex>,
    exact: &'a [ExactReplacement],
    mode: ReplacementMode,
}

impl<'a> SegmentSanitizer<'a> {
    pub fn new(quick: Option<&'a Regex>, exact: &'a [ExactReplacement], mode: ReplacementMode) -> Self {
        Self { quick, exact, mode }
    }

    /// Runs the passes in the configured order, then trims the result.
    ///
    /// When the quick pass runs last, quick pass and trim are repeated until
    /// neither changes the segment: stripping or trimming can expose a new
    /// match (`CO<N.txt` becomes `CON.txt`, `  CON` becomes `CON`).
    pub fn sanitize(&self, segment: &str) -> String {
        let replaced = match self.mode {
            ReplacementMode::QuickOnly => self.quick_pass(segment),
            ReplacementMode::ExactOnly => self.exact_pass(segment),
            ReplacementMode::QuickThenExact => self.exact_pass(&self.quick_pass(segment)),
            ReplacementMode::ExactThenQuick => self.quick_pass(&self.exact_pass(segment)),
        };
        let mut settled = trim_segment(&replaced).to_string();
        if matches!(self.mode, ReplacementMode::QuickOnly | ReplacementMode::ExactThenQuick) {
            // Both steps only ever remove text, so this terminates.
            loop {
                let next = trim_segment(&self.quick_pass(&settled)).to_string();
                if next.len() == settled.len() {
                    break;
                }
                settled = next;
            }
        }
        settled
    }

    /// Strips every match of the alternation pattern, repeating until no match is left.
    pub fn quick_pass(&self, segment: &str) -> String {
        let Some(regex) = self.quick else {
            return segment.to_string();
        };
        let mut current = segment.to_string();
        loop {
            let next = regex.replace_all(&current, "").into_owned();
            if next.len() == current.len() {
                return current;
            }
            current = next;
        }
    }

    /// Applies each literal pair in insertion order. Slower than the quick pass.
    pub fn exact_pass(&self, segment: &str) -> String {
        let mut current = segment.to_string();
        for pair in self.exact {
            if pair.from.is_empty() {
                continue;
            }
            if current.contains(pair.from.as_str()) {
                current = current.replace(pair.from.as_str(), &pair.to);
            }
        }
        current
    }
}

/// Trims surrounding whitespace and trailing periods.
///
/// Whitespace and periods are stripped together from the end so that mixed
/// tails like `"name. ."` settle in one call.
pub fn trim_segment(segment: &str) -> &str {
    segment
        .trim_start()
        .trim_end_matches(|c: char| c.is_whitespace() || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_periods_and_spaces_are_trimmed() {
        assert_eq!(trim_segment("name.. "), "name");
        assert_eq!(trim_segment("  name. . "), "name");
        assert_eq!(trim_segment(".hidden"), ".hidden");
        assert_eq!(trim_segment(".."), "");
        assert_eq!(trim_segment("a.b"), "a.b");
    }

    #[test]
    fn quick_pass_strips_matches() {
        let regex = Regex::new("(?:x)").unwrap();
        let sanitizer = SegmentSanitizer::new(Some(&regex), &[], ReplacementMode::QuickOnly);
        assert_eq!(sanitizer.sanitize("ax b"), "a b");
    }

    #[test]
    fn exact_pass_applies_pairs_in_order() {
        let pairs = vec![ExactReplacement::new("a", "b"), ExactReplacement::new("b", "c")];
        let sanitizer = SegmentSanitizer::new(None, &pairs, ReplacementMode::ExactOnly);
        assert_eq!(sanitizer.sanitize("ab"), "cc");
    }

    #[test]
    fn pass_order_is_observable() {
        let regex = Regex::new("(?:c)").unwrap();
        let pairs = vec![ExactReplacement::new("ab", "cd")];

        let exact_first = SegmentSanitizer::new(Some(&regex), &pairs, ReplacementMode::ExactThenQuick);
        assert_eq!(exact_first.sanitize("ab"), "d");

        let quick_first = SegmentSanitizer::new(Some(&regex), &pairs, ReplacementMode::QuickThenExact);
        assert_eq!(quick_first.sanitize("ab"), "cd");
    }

    #[test]
    fn single_pass_modes_ignore_the_other_collection() {
        let regex = Regex::new("(?:a)").unwrap();
        let pairs = vec![ExactReplacement::new("b", "z")];
        assert_eq!(
            SegmentSanitizer::new(Some(&regex), &pairs, ReplacementMode::QuickOnly).sanitize("ab"),
            "b"
        );
        assert_eq!(
            SegmentSanitizer::new(Some(&regex), &pairs, ReplacementMode::ExactOnly).sanitize("ab"),
            "az"
        );
    }

    #[test]
    fn stripping_that_exposes_a_reserved_name_settles() {
        let regex = Regex::new(r"(?:[<>])|(?:^(?i:CON|NUL)(?:\.|$))").unwrap();
        let sanitizer = SegmentSanitizer::new(Some(&regex), &[], ReplacementMode::QuickOnly);
        assert_eq!(sanitizer.sanitize("CO<N.txt"), "txt");
        assert_eq!(sanitizer.sanitize("CON.CON.txt"), "txt");
        assert_eq!(sanitizer.sanitize("  nul"), "");
    }
}
