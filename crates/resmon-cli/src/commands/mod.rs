//! CLI commands module
//!
//! Contains all CLI command implementations.

pub mod compare;
pub mod monitor;
pub mod simulate;

use crate::output::OutputFormat;

/// Shared context for all commands
pub struct Context {
    pub format: OutputFormat,
    pub quiet: bool,
}
