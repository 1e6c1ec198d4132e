//! setup-mandrel command-line interface.
//!
//! The binary is a thin shell over this library: [`cli`] parses arguments and
//! maps errors to exit codes, [`commands`] wires the GitHub client and the
//! directory tool cache into the core orchestrator, [`export`] hands the
//! result to later GitHub Actions steps.

pub mod cli;
pub mod commands;
pub mod export;
pub mod tracing;

pub use cli::{Cli, CliError, Commands};
pub use commands::{CommandOutput, run};
