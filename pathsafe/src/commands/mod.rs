// pathsafe/src/commands/mod.rs
//! One module per subcommand family.

pub mod fileops;
pub mod sanitize;
