//! Platform-specific code.
//!
//! Provides the command-backed sample source used on the host.

pub mod commands;

pub use commands::{default_command, CommandSampleSource, CommandSpec};
