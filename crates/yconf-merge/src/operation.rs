//! Per-node edit operation resolution.

use yconf_core::{ConfigTree, EditOp, NodeId, OPERATION_ATTR, QName, Result, YconfError};

/// Returns the operation in effect for `node`.
///
/// A node inherits `parent_op` unless it carries the NETCONF `operation`
/// attribute, whose value must be one of `merge`, `replace`, `create`,
/// `delete` or `remove`. `none` is only valid as a request's default
/// operation and is rejected here like any other unknown value.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use yconf_core::{ConfigTree, EditOp, LeafType, SchemaBuilder};
/// use yconf_merge::resolve_operation;
///
/// let mut b = SchemaBuilder::new("urn:t");
/// b.leaf(b.root(), "x", LeafType::String);
/// let schema = Arc::new(b.build().unwrap());
///
/// let delta = ConfigTree::from_json(schema, r#"{"x": "1", "@x": {"operation": "delete"}}"#).unwrap();
/// let x = delta.children(delta.root())[0];
/// assert_eq!(resolve_operation(EditOp::Merge, &delta, x).unwrap(), EditOp::Delete);
/// assert_eq!(resolve_operation(EditOp::Replace, &delta, delta.root()).unwrap(), EditOp::Replace);
/// ```
pub fn resolve_operation(parent_op: EditOp, delta: &ConfigTree, node: NodeId) -> Result<EditOp> {
    match delta.attribute(node, &QName::operation()) {
        None => Ok(parent_op),
        Some(value) => EditOp::from_attribute(value)
            .ok_or_else(|| YconfError::bad_attribute(delta.path(node), OPERATION_ATTR, value)),
    }
}
