//! Post-merge validation.
//!
//! Checks the constraints the merge engine does not enforce on its own:
//! mandatory leaves, leafref targets, and the shape of every node against
//! its schema. Validation stops at the first failure.

use std::collections::HashSet;

use tracing::{debug, instrument};
use yconf_core::{ConfigTree, NodeId, Schema, SchemaId, SchemaKind, ValidationFailure};

use crate::defaults::case_active;
use crate::evaluator::{PathEvaluator, ReferenceEvaluator};

/// Validates `tree` with the built-in [`PathEvaluator`] for leafrefs.
pub fn validate(tree: &ConfigTree) -> Result<(), ValidationFailure> {
    validate_with(tree, &PathEvaluator)
}

/// Validates `tree`, delegating leafref resolution to `evaluator`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use yconf_core::{ConfigTree, LeafType, NodeId, SchemaBuilder};
/// use yconf_merge::validate_with;
///
/// let mut b = SchemaBuilder::new("urn:t");
/// let name = b.leaf(b.root(), "name", LeafType::String);
/// b.set_mandatory(name);
/// let schema = Arc::new(b.build().unwrap());
///
/// let tree = ConfigTree::new(schema);
/// let accept_all = |_: &ConfigTree, _: NodeId, _: &str| true;
/// let failure = validate_with(&tree, &accept_all).unwrap_err();
/// assert!(failure.reason.contains("name"));
/// ```
#[instrument(skip_all)]
pub fn validate_with(tree: &ConfigTree, evaluator: &dyn ReferenceEvaluator) -> Result<(), ValidationFailure> {
    let result = check_node(tree, tree.root(), evaluator);
    if let Err(failure) = &result {
        debug!(reason = %failure.reason, "validation failed");
    }
    result
}

fn check_node(tree: &ConfigTree, node: NodeId, evaluator: &dyn ReferenceEvaluator) -> Result<(), ValidationFailure> {
    let schema = tree.schema();
    let Some(schema_id) = tree.schema_id(node) else {
        return Err(ValidationFailure::new(
            format!("element '{}' is not defined by the schema", tree.qname(node).clark()),
            tree.path(node),
        ));
    };

    check_mandatory(schema, tree, node, schema_id)?;

    for &child in tree.children(node) {
        let Some(child_schema) = tree.schema_id(child) else {
            return Err(ValidationFailure::new(
                format!("element '{}' is not defined by the schema", tree.qname(child).clark()),
                tree.path(child),
            ));
        };
        let child_node = schema.node(child_schema);

        if child_node.is_leafy() {
            if !tree.children(child).is_empty() {
                return Err(ValidationFailure::new(
                    format!("{} '{}' cannot have child elements", child_node.kind, child_node.qname),
                    tree.path(child),
                ));
            }
            if let Some(path) = child_node.leafref_path()
                && !evaluator.evaluate_reference(tree, child, path)
            {
                return Err(ValidationFailure::new(
                    format!(
                        "leafref '{}' has no target for value '{}'",
                        path,
                        tree.value(child).unwrap_or_default()
                    ),
                    tree.path(child),
                ));
            }
            continue;
        }

        if tree.value(child).is_some_and(|v| !v.trim().is_empty()) {
            return Err(ValidationFailure::new(
                format!("{} '{}' cannot carry a value", child_node.kind, child_node.qname),
                tree.path(child),
            ));
        }
        check_node(tree, child, evaluator)?;
    }
    Ok(())
}

/// Every mandatory leaf of an active case must be present. An rpc is
/// checked against the parameters of its `input`.
fn check_mandatory(schema: &Schema, tree: &ConfigTree, node: NodeId, schema_id: SchemaId) -> Result<(), ValidationFailure> {
    let owner = match schema.kind(schema_id) {
        SchemaKind::Rpc => match schema.rpc_input(schema_id) {
            Some(input) => input,
            None => return Ok(()),
        },
        _ => schema_id,
    };

    let present: HashSet<SchemaId> = tree
        .children(node)
        .iter()
        .filter_map(|c| tree.schema_id(*c))
        .collect();
    let missing: Vec<String> = schema
        .children(owner)
        .filter(|id| {
            let child = schema.node(*id);
            child.is_leafy() && child.is_mandatory && !present.contains(id)
        })
        .filter(|id| case_active(schema, tree, node, *id))
        .map(|id| schema.node(id).qname.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    let location = if node == tree.root() {
        "the document root".to_string()
    } else {
        format!("'{}'", tree.qname(node))
    };
    Err(ValidationFailure::new(
        format!("missing mandatory node(s) {} in {}", missing.join(", "), location),
        tree.path(node),
    ))
}
