//! Errors of the command line front end.

use std::path::PathBuf;

use thiserror::Error;
use yconf_core::{DataPath, YconfError};

/// Errors raised while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings could not be layered or deserialized.
    #[error("Failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    /// An input file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine rejected the input.
    #[error(transparent)]
    Yconf(#[from] YconfError),

    /// The output document could not be rendered.
    #[error("Failed to render output: {0}")]
    Render(String),
}

impl CliError {
    /// Creates a Read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a Render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Returns the NETCONF `error-tag` describing this error.
    pub fn error_tag(&self) -> &'static str {
        match self {
            Self::Yconf(err) => err.error_tag(),
            _ => "operation-failed",
        }
    }

    /// Returns the path of the offending node, when known.
    pub fn path(&self) -> Option<&DataPath> {
        match self {
            Self::Yconf(err) => err.path(),
            _ => None,
        }
    }

    /// Process exit code: 1 for rejected input, 2 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Yconf(err) if err.is_user_error() => 1,
            _ => 2,
        }
    }

    /// Renders the error as the multi-line report printed on stderr.
    pub fn report(&self) -> String {
        let mut report = format!("error-tag: {}\nmessage: {}", self.error_tag(), self);
        if let Some(path) = self.path() {
            report.push_str(&format!("\npath: {}", path));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_includes_path() {
        let err = CliError::from(YconfError::data_missing(DataPath::root()));
        let report = err.report();

        assert!(report.starts_with("error-tag: data-missing"));
        assert!(report.contains("path: /"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_read_error_is_operational() {
        let err = CliError::read(
            "missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );

        assert_eq!(err.error_tag(), "operation-failed");
        assert!(err.path().is_none());
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("missing.json"));
    }
}
