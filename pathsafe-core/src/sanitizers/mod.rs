//! The stages of the path sanitization pipeline.
//!
//! A raw path flows through `segmenter` (separator unification and splitting),
//! `root` (root classification under the configured policy), `content`
//! (quick and exact replacement passes plus trimming) and `reassembler`
//! (joining and optional full qualification). `compiler` turns the
//! quick-replacement tokens into the single alternation pattern used by the
//! quick pass.

pub mod compiler;
pub mod content;
pub mod reassembler;
pub mod root;
pub mod segmenter;
