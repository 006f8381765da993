//! Common type definitions for yconf.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace of the NETCONF base protocol (RFC 6241).
pub const NETCONF_BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Local name of the per-node edit operation attribute.
pub const OPERATION_ATTR: &str = "operation";

/// Local name of the serial attribute carried on a configuration root.
pub const SERIAL_ATTR: &str = "serial";

/// Qualified name of a schema or data node.
///
/// A name is identified by its namespace URI and its local name. Two nodes
/// with the same local name in different namespaces are different nodes.
///
/// # Example
///
/// ```
/// use yconf_core::QName;
///
/// let name = QName::new("urn:example:car", "brand");
/// assert_eq!(name.name(), "brand");
/// assert_eq!(name.to_string(), "brand");
/// assert_eq!(name.clark(), "{urn:example:car}brand");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    namespace: String,
    name: String,
}

impl QName {
    /// Creates a new qualified name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Creates a name without a namespace.
    pub fn local(name: impl Into<String>) -> Self {
        Self::new("", name)
    }

    /// The qualified name of the NETCONF `operation` attribute.
    pub fn operation() -> Self {
        Self::new(NETCONF_BASE_NS, OPERATION_ATTR)
    }

    /// Returns the namespace URI.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the local name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if both namespace and local name match.
    pub fn matches(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }

    /// Renders the name in Clark notation (`{namespace}name`).
    pub fn clark(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{{{}}}{}", self.namespace, self.name)
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// NETCONF edit-config operation (RFC 6241 §7.2).
///
/// `None` is only meaningful as the default operation of a request; it is
/// never accepted as a per-node override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOp {
    None,
    #[default]
    Merge,
    Replace,
    Create,
    Delete,
    Remove,
}

impl EditOp {
    /// Looks up a per-node override value. `none` is not a legal override.
    ///
    /// # Example
    ///
    /// ```
    /// use yconf_core::EditOp;
    ///
    /// assert_eq!(EditOp::from_attribute("delete"), Some(EditOp::Delete));
    /// assert_eq!(EditOp::from_attribute("none"), None);
    /// assert_eq!(EditOp::from_attribute("Merge"), None);
    /// ```
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "merge" => Some(Self::Merge),
            "replace" => Some(Self::Replace),
            "create" => Some(Self::Create),
            "delete" => Some(Self::Delete),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }

    /// Returns the wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Merge => "merge",
            Self::Replace => "replace",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Remove => "remove",
        }
    }

    /// Returns true for the operations that take data away.
    pub fn is_deletion(&self) -> bool {
        matches!(self, Self::Delete | Self::Remove)
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditOp {
    type Err = String;

    /// Parses a default operation, which also admits `none`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "none" {
            return Ok(Self::None);
        }
        Self::from_attribute(s).ok_or_else(|| format!("unknown edit operation '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_equality_includes_namespace() {
        let a = QName::new("urn:a", "x");
        let b = QName::new("urn:b", "x");
        assert_ne!(a, b);
        assert!(a.matches("urn:a", "x"));
        assert_eq!(QName::local("x").clark(), "x");
    }

    #[test]
    fn test_operation_attribute_name() {
        let op = QName::operation();
        assert_eq!(op.namespace(), NETCONF_BASE_NS);
        assert_eq!(op.name(), "operation");
    }

    #[test]
    fn test_edit_op_parsing() {
        assert_eq!("none".parse::<EditOp>().unwrap(), EditOp::None);
        assert_eq!("replace".parse::<EditOp>().unwrap(), EditOp::Replace);
        assert!("REPLACE".parse::<EditOp>().is_err());
        assert_eq!(EditOp::default(), EditOp::Merge);
    }

    #[test]
    fn test_edit_op_serde() {
        let json = serde_json::to_string(&EditOp::Create).unwrap();
        assert_eq!(json, "\"create\"");
        let op: EditOp = serde_json::from_str("\"remove\"").unwrap();
        assert_eq!(op, EditOp::Remove);
        assert!(op.is_deletion());
    }
}
