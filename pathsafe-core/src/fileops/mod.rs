// File: pathsafe-core/src/fileops/mod.rs
//! File operations: plain primitives and their backup-guarded counterparts.
//!
//! * `plain`: the `FileOps` / `AsyncFileOps` seams and their std / tokio implementations.
//! * `safe`: the `with_backup` combinators, the safe file managers and one-shot helpers.
//! * `encoding`: text encodings for string appends.
//!
//! License: MIT OR APACHE 2.0

pub mod encoding;
pub mod plain;
pub mod safe;
