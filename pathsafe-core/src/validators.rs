// File: pathsafe-core/src/validators.rs
//! Filesystem grammar checks for file names, directories and file paths.
//!
//! These functions answer one question: would the given string be accepted
//! by the target operating system as a name or path? They never touch the
//! filesystem. The sanitizer's optional full-qualification step uses them to
//! decide whether a result is worth resolving against the working directory.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt;

use crate::sanitizers::root::split_drive_prefix;

/// Longest single path component accepted on either platform, in bytes.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// The filesystem grammar to validate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetOs {
    Windows,
    Unix,
}

impl TargetOs {
    /// The grammar of the platform this binary was built for.
    pub fn host() -> Self {
        if cfg!(windows) {
            TargetOs::Windows
        } else {
            TargetOs::Unix
        }
    }

    fn is_separator(self, c: char) -> bool {
        match self {
            TargetOs::Windows => c == '\\' || c == '/',
            TargetOs::Unix => c == '/',
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetOs::Windows => write!(f, "windows"),
            TargetOs::Unix => write!(f, "unix"),
        }
    }
}

static WINDOWS_RESERVED_NAMES: Lazy<HashSet<String>> = Lazy::new(|| {
    let mut set: HashSet<String> = ["CON", "PRN", "AUX", "NUL"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for n in 1..=9 {
        set.insert(format!("COM{}", n));
        set.insert(format!("LPT{}", n));
    }
    set
});

const WINDOWS_FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Checks a single path component.
pub fn is_valid_filename(name: &str, os: TargetOs) -> bool {
    if name.is_empty() || name.len() > MAX_FILENAME_LENGTH || name == "." || name == ".." {
        return false;
    }
    if name.contains('\0') {
        return false;
    }

    match os {
        TargetOs::Unix => !name.contains('/'),
        TargetOs::Windows => {
            if name.chars().any(|c| c.is_control() || WINDOWS_FORBIDDEN_CHARS.contains(&c)) {
                return false;
            }
            if name.ends_with(' ') || name.ends_with('.') {
                return false;
            }
            let base = name.split('.').next().unwrap_or(name);
            !WINDOWS_RESERVED_NAMES.contains(&base.to_ascii_uppercase())
        }
    }
}

/// Splits a path into its root (if any) and the remainder.
fn split_root(path: &str, os: TargetOs) -> (Option<&str>, &str) {
    if os == TargetOs::Windows {
        if let Some((drive, rest)) = split_drive_prefix(path) {
            let mut chars = rest.chars();
            return match chars.next() {
                Some(c) if os.is_separator(c) => {
                    let root_len = drive.len() + c.len_utf8();
                    (Some(&path[..root_len]), chars.as_str())
                }
                // A bare drive letter without a separator is drive-relative, not rooted.
                _ => (None, path),
            };
        }
    }
    match path.chars().next() {
        Some(c) if os.is_separator(c) => (Some(&path[..c.len_utf8()]), &path[c.len_utf8()..]),
        _ => (None, path),
    }
}

/// Checks every component of `rest`, which must not start with a separator.
///
/// A single trailing separator is accepted; returns the number of components.
fn components_valid(rest: &str, os: TargetOs) -> Option<usize> {
    let trimmed = match rest.chars().last() {
        Some(c) if os.is_separator(c) => &rest[..rest.len() - c.len_utf8()],
        _ => rest,
    };
    if trimmed.is_empty() {
        return Some(0);
    }
    let mut count = 0;
    for component in trimmed.split(|c| os.is_separator(c)) {
        if component == "." || component == ".." {
            count += 1;
            continue;
        }
        if !is_valid_filename(component, os) {
            return None;
        }
        count += 1;
    }
    Some(count)
}

/// Checks a directory path. A root on its own is a valid directory.
pub fn is_valid_directory(path: &str, os: TargetOs, root_required: bool) -> bool {
    if path.is_empty() {
        return false;
    }
    let (root, rest) = split_root(path, os);
    if root_required && root.is_none() {
        return false;
    }
    match components_valid(rest, os) {
        Some(0) => root.is_some(),
        Some(_) => true,
        None => false,
    }
}

/// Checks a file path: at least one component and no trailing separator.
pub fn is_valid_file_path(path: &str, os: TargetOs, root_required: bool) -> bool {
    if path.chars().last().map_or(true, |c| os.is_separator(c)) {
        return false;
    }
    let (root, rest) = split_root(path, os);
    if root_required && root.is_none() {
        return false;
    }
    let last = rest.rsplit(|c| os.is_separator(c)).next().unwrap_or(rest);
    if last == "." || last == ".." {
        return false;
    }
    matches!(components_valid(rest, os), Some(n) if n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filenames_unix() {
        assert!(is_valid_filename("report.txt", TargetOs::Unix));
        assert!(is_valid_filename("CON", TargetOs::Unix));
        assert!(is_valid_filename("a:b", TargetOs::Unix));
        assert!(!is_valid_filename("a/b", TargetOs::Unix));
        assert!(!is_valid_filename("", TargetOs::Unix));
        assert!(!is_valid_filename("..", TargetOs::Unix));
        assert!(!is_valid_filename("nul\0byte", TargetOs::Unix));
        assert!(!is_valid_filename(&"x".repeat(256), TargetOs::Unix));
    }

    #[test]
    fn test_filenames_windows() {
        assert!(is_valid_filename("report.txt", TargetOs::Windows));
        assert!(is_valid_filename("CONSOLE", TargetOs::Windows));
        assert!(!is_valid_filename("con", TargetOs::Windows));
        assert!(!is_valid_filename("Lpt3.log", TargetOs::Windows));
        assert!(!is_valid_filename("a:b", TargetOs::Windows));
        assert!(!is_valid_filename("what?", TargetOs::Windows));
        assert!(!is_valid_filename("trailing.", TargetOs::Windows));
        assert!(!is_valid_filename("trailing ", TargetOs::Windows));
        assert!(!is_valid_filename("tab\there", TargetOs::Windows));
    }

    #[test]
    fn test_directories() {
        assert!(is_valid_directory("/", TargetOs::Unix, true));
        assert!(is_valid_directory("/usr/lib/", TargetOs::Unix, true));
        assert!(is_valid_directory("usr/lib", TargetOs::Unix, false));
        assert!(!is_valid_directory("usr/lib", TargetOs::Unix, true));
        assert!(!is_valid_directory("", TargetOs::Unix, false));
        assert!(!is_valid_directory("a//b", TargetOs::Unix, false));

        assert!(is_valid_directory(r"C:\", TargetOs::Windows, true));
        assert!(is_valid_directory(r"C:\Users\me", TargetOs::Windows, true));
        assert!(is_valid_directory(r"\Users", TargetOs::Windows, true));
        assert!(!is_valid_directory("C:Users", TargetOs::Windows, true));
        assert!(!is_valid_directory(r"C:\a|b", TargetOs::Windows, false));
    }

    #[test]
    fn test_file_paths() {
        assert!(is_valid_file_path("/etc/hosts", TargetOs::Unix, true));
        assert!(is_valid_file_path("notes.md", TargetOs::Unix, false));
        assert!(is_valid_file_path("../notes.md", TargetOs::Unix, false));
        assert!(!is_valid_file_path("/etc/", TargetOs::Unix, false));
        assert!(!is_valid_file_path("/", TargetOs::Unix, false));
        assert!(!is_valid_file_path("", TargetOs::Unix, false));
        assert!(!is_valid_file_path("a/..", TargetOs::Unix, false));

        assert!(is_valid_file_path(r"D:\data\x.bin", TargetOs::Windows, true));
        assert!(is_valid_file_path("D:/data/x.bin", TargetOs::Windows, true));
        assert!(!is_valid_file_path(r"D:\data\aux.txt", TargetOs::Windows, true));
    }
}
