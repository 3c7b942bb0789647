// File: pathsafe-core/src/sanitized_path.rs
//! The detailed result of one sanitization run.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sanitized path together with how it was assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedPath {
    /// The final path string.
    pub path: String,
    /// The root written in front of the segments, if one was kept or forced.
    pub root: Option<String>,
    /// The non-empty segments that made it into `path`, in order.
    pub segments: Vec<String>,
    /// Whether `path` was resolved against the working directory.
    pub qualified: bool,
}

impl SanitizedPath {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    pub fn into_string(self) -> String {
        self.path
    }
}

impl fmt::Display for SanitizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl AsRef<str> for SanitizedPath {
    fn as_ref(&self) -> &str {
        &self.path
    }
}
