//! yconf CLI - command line front end for the merge engine
//!
//! Reads a schema description plus base and delta configurations from
//! disk, runs the merge and prints the resulting report.

pub mod cli;
pub mod commands;
pub mod error;
pub mod settings;

// Re-exports
pub use cli::{Cli, Command, MergeArgs, OutputFormat, ValidateArgs};
pub use commands::run;
pub use error::CliError;
pub use settings::{Overrides, Settings};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
