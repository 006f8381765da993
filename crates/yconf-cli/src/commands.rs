//! Command implementations.
//!
//! Each command returns the text to print on stdout so it can be driven
//! from tests without a process boundary.

use std::path::Path;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info, instrument};
use yconf_core::{ConfigFormat, ConfigTree, Schema, YconfError};
use yconf_merge::{Merger, validate};

use crate::cli::{Cli, Command, MergeArgs, OutputFormat, ValidateArgs};
use crate::error::CliError;
use crate::settings::Settings;

/// Runs the parsed command line with already loaded settings.
pub fn run(cli: &Cli, settings: &Settings) -> Result<String, CliError> {
    match &cli.command {
        Command::Merge(args) => merge(args, settings),
        Command::Validate(args) => validate_data(args, settings),
    }
}

/// Merges the delta file into the base file and reports the outcome.
#[instrument(skip_all, fields(delta = %args.delta.display()))]
pub fn merge(args: &MergeArgs, settings: &Settings) -> Result<String, CliError> {
    let schema = load_schema(&args.schema)?;
    let base = match &args.base {
        Some(path) => load_tree(&schema, path)?,
        None => ConfigTree::new(schema.clone()),
    };
    let delta = load_tree(&schema, &args.delta)?;

    let default_op = args
        .default_operation
        .unwrap_or_else(|| settings.default_operation());
    let merger = Merger::with_options(schema, settings.merge_options()?);
    let result = merger.copy_and_merge(&base, &delta, default_op)?;
    info!(
        changed = !result.is_noop(),
        deletions = result.deletions().len(),
        "merge complete"
    );

    if args.validate {
        validate(result.tree()).map_err(YconfError::from)?;
        debug!("merged configuration is valid");
    }

    render(&result.to_report(), settings.output_format())
}

/// Validates a single configuration file.
#[instrument(skip_all, fields(data = %args.data.display()))]
pub fn validate_data(args: &ValidateArgs, settings: &Settings) -> Result<String, CliError> {
    let schema = load_schema(&args.schema)?;
    let tree = load_tree(&schema, &args.data)?;

    validate(&tree).map_err(YconfError::from)?;
    info!("configuration is valid");

    render(&json!({ "valid": true }), settings.output_format())
}

/// Loads a schema description; `.json` files are JSON, anything else YAML.
pub fn load_schema(path: &Path) -> Result<Arc<Schema>, CliError> {
    let text = read(path)?;
    let schema = match extension(path).as_deref() {
        Some("json") => Schema::from_json(&text)?,
        _ => Schema::from_yaml(&text)?,
    };
    debug!(path = %path.display(), nodes = schema.len(), "schema loaded");
    Ok(Arc::new(schema))
}

/// Loads a configuration tree, picking the encoding from the extension.
pub fn load_tree(schema: &Arc<Schema>, path: &Path) -> Result<ConfigTree, CliError> {
    let text = read(path)?;
    let format = extension(path)
        .and_then(|ext| ConfigFormat::from_extension(&ext))
        .unwrap_or(ConfigFormat::Json);
    Ok(format.parse(schema, &text)?)
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::read(path, e))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

fn render(value: &Value, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| CliError::render(e.to_string()))
        },
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| CliError::render(e.to_string()))
        },
    }
}
