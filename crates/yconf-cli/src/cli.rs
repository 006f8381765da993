//! CLI command definitions for yconf.
//!
//! The main entry point is the `Cli` struct which contains subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use yconf_core::{ConfigFormat, EditOp};

/// Output encoding of command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl From<OutputFormat> for ConfigFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ConfigFormat::Json,
            OutputFormat::Yaml => ConfigFormat::Yaml,
        }
    }
}

/// NETCONF edit-config merges over YANG-modeled configuration
#[derive(Parser, Debug)]
#[command(name = "yconf", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a settings file (YAML, TOML or JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set (overrides settings)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Output format (overrides settings)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge a delta into a base configuration
    Merge(MergeArgs),

    /// Validate a configuration against its schema
    Validate(ValidateArgs),
}

/// Arguments for the merge subcommand
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Schema description (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Base configuration; an empty configuration when omitted
    #[arg(short, long, value_name = "FILE")]
    pub base: Option<PathBuf>,

    /// Edit to apply
    #[arg(short, long, value_name = "FILE")]
    pub delta: PathBuf,

    /// Operation for nodes without an operation attribute (overrides settings)
    #[arg(long, value_name = "OP", value_parser = parse_edit_op)]
    pub default_operation: Option<EditOp>,

    /// Validate the merged configuration
    #[arg(long)]
    pub validate: bool,
}

/// Arguments for the validate subcommand
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema description (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Configuration to validate
    #[arg(short, long, value_name = "FILE")]
    pub data: PathBuf,
}

fn parse_edit_op(value: &str) -> Result<EditOp, String> {
    value.parse()
}
