// File: pathsafe-core/src/fileops/encoding.rs
//! Text encodings for the string append operations.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// The platform line ending appended when a caller asks for a newline.
pub const LINE_ENDING: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// How appended text is turned into bytes. No byte-order mark is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            TextEncoding::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        }
    }

    /// Encodes `lines` back to back, each followed by [`LINE_ENDING`] when `newline` is set.
    pub fn encode_lines<I, S>(self, lines: I, newline: bool) -> Vec<u8>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            if newline {
                text.push_str(LINE_ENDING);
            }
        }
        self.encode(&text)
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Utf16Le => "utf16_le",
            TextEncoding::Utf16Be => "utf16_be",
        };
        f.write_str(s)
    }
}
