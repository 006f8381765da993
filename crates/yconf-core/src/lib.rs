//! yconf Core - Domain types for YANG-modeled configuration
//!
//! This crate provides the foundational types shared by the merge engine
//! and its callers: the read-only schema model, arena-backed configuration
//! trees, instance paths, tree encodings and the error hierarchy.

pub mod error;
pub mod format;
pub mod path;
pub mod schema;
pub mod tree;
pub mod types;

pub use error::{Result, ValidationFailure, YconfError};
pub use format::{ConfigFormat, FormatParser, FormatSerializer};
pub use path::{DataPath, PathSegment};
pub use schema::{LeafType, ModuleDef, NodeDef, Schema, SchemaBuilder, SchemaId, SchemaKind, SchemaNode};
pub use tree::{ConfigTree, NodeId};
pub use types::{EditOp, NETCONF_BASE_NS, OPERATION_ATTR, QName, SERIAL_ATTR};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
