//! Error types for yconf.
//!
//! This module defines the error hierarchy used throughout the
//! configuration core. All errors implement the standard
//! `std::error::Error` trait via `thiserror`.
//!
//! # Error Handling Philosophy
//!
//! - Functions that can fail return `Result<T, YconfError>`
//! - A merge aborts on the first semantic error; nothing partial is returned
//! - Semantic errors carry the path of the offending node so callers can
//!   build protocol-compliant `rpc-error` replies
//!
//! # Example
//!
//! ```
//! use yconf_core::{DataPath, Result, YconfError};
//!
//! fn check_port(value: &str) -> Result<u16> {
//!     value
//!         .parse()
//!         .map_err(|_| YconfError::invalid_value(DataPath::root(), format!("bad port '{}'", value)))
//! }
//!
//! let err = check_port("http").unwrap_err();
//! assert_eq!(err.error_tag(), "invalid-value");
//! ```

use std::io;
use thiserror::Error;

use crate::path::DataPath;

/// Failure reported by the post-merge validator.
///
/// Validation stops at the first problem found, so a failure always
/// describes exactly one problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {reason}")]
pub struct ValidationFailure {
    /// Human readable description of the problem.
    pub reason: String,
    /// Node at which the problem was found.
    pub path: Option<DataPath>,
}

impl ValidationFailure {
    /// Creates a failure located at `path`.
    pub fn new(reason: impl Into<String>, path: DataPath) -> Self {
        Self {
            reason: reason.into(),
            path: Some(path),
        }
    }
}

/// Main error type for yconf operations.
#[derive(Debug, Error)]
pub enum YconfError {
    /// Unknown schema child, unparsable value, or value on an `empty` leaf.
    #[error("Invalid value at '{path}': {message}")]
    InvalidValue {
        /// Offending node
        path: DataPath,
        /// What was wrong
        message: String,
    },

    /// A delete targeted data that does not exist.
    #[error("Data missing at '{path}'")]
    DataMissing {
        /// Target of the delete
        path: DataPath,
    },

    /// A create targeted data that already exists.
    #[error("Data already exists at '{path}'")]
    DataExists {
        /// Target of the create
        path: DataPath,
    },

    /// An attribute carried a value that is not allowed.
    #[error("Bad attribute '{attribute}' with value '{value}' at '{path}'")]
    BadAttribute {
        /// Node carrying the attribute
        path: DataPath,
        /// Local name of the attribute
        attribute: String,
        /// The rejected value
        value: String,
    },

    /// The tree does not satisfy the schema's constraints.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// A schema construct the merge engine does not handle.
    ///
    /// Never caused by user input against a conformant schema.
    #[error("Unsupported schema construct '{kind}' at '{path}'")]
    UnsupportedConstruct {
        /// Statement kind that was encountered
        kind: String,
        /// Where it was encountered
        path: DataPath,
    },

    /// Error decoding a tree or schema description.
    #[error("Failed to parse '{source_name}': {message}")]
    ParseError {
        /// Input that failed (file name, "json", ...)
        source_name: String,
        /// Description of the parse error
        message: String,
        /// Underlying error, if any
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A schema description is inconsistent.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invalid engine or loader configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl YconfError {
    // ============================================
    // Convenience constructors
    // ============================================

    /// Creates an InvalidValue error.
    pub fn invalid_value(path: DataPath, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            path,
            message: message.into(),
        }
    }

    /// Creates a DataMissing error.
    pub fn data_missing(path: DataPath) -> Self {
        Self::DataMissing { path }
    }

    /// Creates a DataExists error.
    pub fn data_exists(path: DataPath) -> Self {
        Self::DataExists { path }
    }

    /// Creates a BadAttribute error.
    pub fn bad_attribute(
        path: DataPath,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::BadAttribute {
            path,
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Creates an UnsupportedConstruct error.
    pub fn unsupported(kind: impl Into<String>, path: DataPath) -> Self {
        Self::UnsupportedConstruct {
            kind: kind.into(),
            path,
        }
    }

    /// Creates a ParseError without a cause.
    pub fn parse_error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            source_name: source.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a ParseError with a cause.
    pub fn parse_error_with_cause<E>(
        source: impl Into<String>,
        message: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ParseError {
            source_name: source.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates a Schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Creates an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================
    // Query methods
    // ============================================

    /// Returns the path of the offending node, when known.
    pub fn path(&self) -> Option<&DataPath> {
        match self {
            Self::InvalidValue { path, .. }
            | Self::DataMissing { path }
            | Self::DataExists { path }
            | Self::BadAttribute { path, .. }
            | Self::UnsupportedConstruct { path, .. } => Some(path),
            Self::Validation(failure) => failure.path.as_ref(),
            _ => None,
        }
    }

    /// Returns the NETCONF `error-tag` (RFC 6241 Appendix A) for this error.
    pub fn error_tag(&self) -> &'static str {
        match self {
            Self::InvalidValue { .. } => "invalid-value",
            Self::DataMissing { .. } => "data-missing",
            Self::DataExists { .. } => "data-exists",
            Self::BadAttribute { .. } => "bad-attribute",
            Self::ParseError { .. } => "malformed-message",
            _ => "operation-failed",
        }
    }

    /// Returns true if the error was caused by the submitted data rather
    /// than by the schema or the engine.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidValue { .. }
                | Self::DataMissing { .. }
                | Self::DataExists { .. }
                | Self::BadAttribute { .. }
                | Self::Validation(_)
                | Self::ParseError { .. }
        )
    }

    /// Returns true if this is a validation failure.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a parse error.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }

    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Type alias for Results with YconfError.
pub type Result<T> = std::result::Result<T, YconfError>;
