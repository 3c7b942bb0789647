// pathsafe/src/ui/output_format.rs
//! Status message formatting for stderr.
//!
//! Messages are prefixed with a coloured tag when the destination is a
//! terminal and with a plain tag otherwise.
//! License: MIT OR Apache-2.0

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warn,
    Error,
}

impl MessageKind {
    fn tag(self) -> &'static str {
        match self {
            MessageKind::Info => "info",
            MessageKind::Success => "done",
            MessageKind::Warn => "warning",
            MessageKind::Error => "error",
        }
    }
}

/// Writes one tagged message line to `writer`.
pub fn print_message<W: Write>(
    writer: &mut W,
    kind: MessageKind,
    msg: &str,
    enable_colors: bool,
) -> io::Result<()> {
    let tag = kind.tag();
    if enable_colors {
        match kind {
            MessageKind::Info => writeln!(writer, "{} {}", format!("[{}]", tag).cyan(), msg),
            MessageKind::Success => writeln!(writer, "{} {}", format!("[{}]", tag).green(), msg),
            MessageKind::Warn => writeln!(writer, "{} {}", format!("[{}]", tag).yellow(), msg),
            MessageKind::Error => writeln!(writer, "{} {}", format!("[{}]", tag).red().bold(), msg),
        }
    } else {
        writeln!(writer, "[{}] {}", tag, msg)
    }
}

fn to_stderr(kind: MessageKind, msg: &str) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = print_message(&mut io::stderr(), kind, msg, stderr_supports_color);
}

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>) {
    to_stderr(MessageKind::Info, msg.as_ref());
}

/// Helper for printing success messages to stderr.
pub fn success_msg(msg: impl AsRef<str>) {
    to_stderr(MessageKind::Success, msg.as_ref());
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>) {
    to_stderr(MessageKind::Warn, msg.as_ref());
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>) {
    to_stderr(MessageKind::Error, msg.as_ref());
}
