//! Layered settings for the command line front end.
//!
//! Sources are applied in order, later ones winning: built-in defaults, an
//! optional settings file, `YCONF_*` environment variables and finally the
//! command line flags.

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use yconf_core::EditOp;
use yconf_merge::MergeOptions;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Effective settings of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    log_level: String,

    /// Encoding of command output.
    #[serde(default)]
    output_format: OutputFormat,

    /// Operation for delta nodes without an operation attribute.
    #[serde(default)]
    default_operation: EditOp,

    /// Root attribute carried over from the base configuration.
    #[serde(default = "default_serial_attribute")]
    serial_attribute: String,

    /// Whether schema defaults are filled in after merging.
    #[serde(default = "default_true")]
    fill_defaults: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_serial_attribute() -> String {
    yconf_core::SERIAL_ATTR.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output_format: OutputFormat::default(),
            default_operation: EditOp::default(),
            serial_attribute: default_serial_attribute(),
            fill_defaults: true,
        }
    }
}

/// Command line values that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub default_operation: Option<EditOp>,
}

impl Settings {
    /// Loads settings from the optional file, the environment and `overrides`.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, CliError> {
        Self::load_with_env(path, overrides, environment())
    }

    fn load_with_env(
        path: Option<&Path>,
        overrides: &Overrides,
        env: Environment,
    ) -> Result<Self, CliError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(env)
            .set_override_option("log_level", overrides.log_level.clone())?
            .set_override_option(
                "output_format",
                overrides.output_format.map(output_format_name),
            )?
            .set_override_option(
                "default_operation",
                overrides.default_operation.map(|op| op.as_str()),
            )?
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Returns the log filter.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Returns the output encoding.
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Returns the default edit operation.
    pub fn default_operation(&self) -> EditOp {
        self.default_operation
    }

    /// Builds the merge engine options described by these settings.
    pub fn merge_options(&self) -> Result<MergeOptions, CliError> {
        let options = MergeOptions::builder()
            .default_operation(self.default_operation)
            .serial_attribute(self.serial_attribute.as_str())
            .fill_defaults(self.fill_defaults)
            .build()?;
        Ok(options)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("YCONF")
        .prefix_separator("_")
        .separator("__")
}

fn output_format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Json => "json",
        OutputFormat::Yaml => "yaml",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn no_env() -> Environment {
        environment().source(Some(HashMap::new()))
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = Settings::load_with_env(None, &Overrides::default(), no_env()).unwrap();
        assert_eq!(settings, Settings::default());

        let options = settings.merge_options().unwrap();
        assert_eq!(options.default_operation(), EditOp::Merge);
        assert_eq!(options.serial_attribute(), "serial");
        assert!(options.fill_defaults());
    }

    #[test]
    fn test_file_then_env_then_flags() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "log_level: debug\noutput_format: yaml\ndefault_operation: replace\nfill_defaults: false"
        )
        .unwrap();

        let env = environment().source(Some(HashMap::from([(
            "YCONF_LOG_LEVEL".to_string(),
            "trace".to_string(),
        )])));
        let overrides = Overrides {
            default_operation: Some(EditOp::None),
            ..Overrides::default()
        };

        let settings = Settings::load_with_env(Some(file.path()), &overrides, env).unwrap();
        assert_eq!(settings.log_level(), "trace");
        assert_eq!(settings.output_format(), OutputFormat::Yaml);
        assert_eq!(settings.default_operation(), EditOp::None);
        assert!(!settings.merge_options().unwrap().fill_defaults());
    }

    #[test]
    fn test_blank_serial_attribute_is_rejected() {
        let settings = Settings {
            serial_attribute: "  ".to_string(),
            ..Settings::default()
        };
        let err = settings.merge_options().unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unknown_operation_in_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"default_operation": "purge"}}"#).unwrap();

        let result = Settings::load_with_env(Some(file.path()), &Overrides::default(), no_env());
        assert!(matches!(result, Err(CliError::Settings(_))));
    }
}
