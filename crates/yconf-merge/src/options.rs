//! Merge engine configuration.

use serde::{Deserialize, Serialize};
use yconf_core::{EditOp, QName, Result, SERIAL_ATTR, YconfError};

/// Configuration for a [`Merger`](crate::Merger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOptions {
    /// Operation applied to delta nodes without an `operation` attribute.
    #[serde(default)]
    default_operation: EditOp,

    /// Local name of the root attribute copied from the base tree.
    #[serde(default = "default_serial_attribute")]
    serial_attribute: String,

    /// Whether to insert schema defaults after each edited level.
    #[serde(default = "default_true")]
    fill_defaults: bool,
}

fn default_serial_attribute() -> String {
    SERIAL_ATTR.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            default_operation: EditOp::default(),
            serial_attribute: default_serial_attribute(),
            fill_defaults: true,
        }
    }
}

impl MergeOptions {
    /// Creates a new builder for MergeOptions.
    pub fn builder() -> MergeOptionsBuilder {
        MergeOptionsBuilder::default()
    }

    /// Returns the default edit operation.
    pub fn default_operation(&self) -> EditOp {
        self.default_operation
    }

    /// Returns the serial attribute name.
    pub fn serial_attribute(&self) -> &str {
        &self.serial_attribute
    }

    /// Returns the serial attribute as an unqualified name.
    pub fn serial_qname(&self) -> QName {
        QName::local(self.serial_attribute.as_str())
    }

    /// Returns whether defaults are filled in.
    pub fn fill_defaults(&self) -> bool {
        self.fill_defaults
    }
}

/// Builder for MergeOptions.
#[derive(Debug, Default)]
pub struct MergeOptionsBuilder {
    default_operation: Option<EditOp>,
    serial_attribute: Option<String>,
    fill_defaults: Option<bool>,
}

impl MergeOptionsBuilder {
    /// Sets the default edit operation.
    pub fn default_operation(mut self, op: EditOp) -> Self {
        self.default_operation = Some(op);
        self
    }

    /// Sets the name of the root serial attribute.
    pub fn serial_attribute(mut self, name: impl Into<String>) -> Self {
        self.serial_attribute = Some(name.into());
        self
    }

    /// Enables or disables default filling.
    pub fn fill_defaults(mut self, enabled: bool) -> Self {
        self.fill_defaults = Some(enabled);
        self
    }

    /// Builds the options.
    pub fn build(self) -> Result<MergeOptions> {
        let serial_attribute = self
            .serial_attribute
            .unwrap_or_else(default_serial_attribute);
        if serial_attribute.trim().is_empty() {
            return Err(YconfError::invalid_config("serial attribute name cannot be empty"));
        }

        Ok(MergeOptions {
            default_operation: self.default_operation.unwrap_or_default(),
            serial_attribute,
            fill_defaults: self.fill_defaults.unwrap_or(true),
        })
    }
}
