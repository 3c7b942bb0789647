// pathsafe/src/ui/mod.rs
//! Terminal output helpers for the pathsafe binary.

pub mod output_format;
