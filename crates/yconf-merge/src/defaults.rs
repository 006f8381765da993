//! Schema default insertion and choice/case bookkeeping.

use std::sync::Arc;

use tracing::trace;
use yconf_core::{ConfigTree, NodeId, Schema, SchemaId, SchemaKind};

/// Inserts the schema defaults missing under `node`, mirroring every
/// insertion under `changes_node`.
///
/// Descends into containers that carry defaults further down, creating
/// absent non-presence containers on the way and pruning them again when
/// nothing ends up inside. Leaves inside a choice are only inserted when
/// their case is the active one, or the choice's default case when no
/// case is active.
///
/// Returns true if anything was inserted.
pub fn fill_defaults(
    tree: &mut ConfigTree,
    node: NodeId,
    changes: &mut ConfigTree,
    changes_node: NodeId,
) -> bool {
    let schema = Arc::clone(tree.schema());
    let Some(schema_id) = tree.schema_id(node) else {
        return false;
    };

    let mut changed = false;
    for child in schema.children(schema_id) {
        let child_node = schema.node(child);
        if child_node.default_value.is_none() && !child_node.has_descendant_default {
            continue;
        }

        if let Some(existing) = tree.find_child(node, &child_node.qname) {
            if child_node.kind == SchemaKind::Container {
                let (changes_child, created) = match changes.find_child(changes_node, &child_node.qname) {
                    Some(found) => (found, false),
                    None => (changes.create_child(changes_node, child, None), true),
                };
                if fill_defaults(tree, existing, changes, changes_child) {
                    changed = true;
                } else if created {
                    changes.remove(changes_child);
                }
            }
            continue;
        }

        if !default_allowed(&schema, tree, node, child) {
            continue;
        }

        match child_node.kind {
            SchemaKind::Container => {
                let tree_child = tree.create_child(node, child, None);
                let changes_child = changes.create_child(changes_node, child, None);
                if fill_defaults(tree, tree_child, changes, changes_child) {
                    changed = true;
                } else {
                    tree.remove(tree_child);
                    changes.remove(changes_child);
                }
            },
            SchemaKind::Leaf => {
                if let Some(default) = &child_node.default_value {
                    trace!(leaf = %child_node.qname, value = %default, "inserting default");
                    tree.create_child(node, child, Some(default.clone()));
                    changes.create_child(changes_node, child, Some(default.clone()));
                    changed = true;
                }
            },
            _ => {},
        }
    }
    changed
}

/// Returns true if a default for `candidate` may be inserted under
/// `parent`, given the cases already populated there.
///
/// Every enclosing choice is checked: a case of it must be active and be
/// the candidate's case, or, with no active case, the candidate's case
/// must be the choice's default case.
pub fn default_allowed(schema: &Schema, tree: &ConfigTree, parent: NodeId, candidate: SchemaId) -> bool {
    default_allowed_without(schema, tree, parent, candidate, &[])
}

/// Like [`default_allowed`], but judged as if the children in `leaving`
/// were already gone from `parent`.
pub fn default_allowed_without(
    schema: &Schema,
    tree: &ConfigTree,
    parent: NodeId,
    candidate: SchemaId,
    leaving: &[NodeId],
) -> bool {
    schema
        .case_chain(candidate)
        .into_iter()
        .all(|(case, choice)| match case_state(schema, tree, parent, choice, case, leaving) {
            CaseState::Active => true,
            CaseState::Conflicting => false,
            CaseState::Inactive => schema.node(choice).default_case == Some(case),
        })
}

/// Returns true if every case enclosing `id` has a populated sibling under
/// `parent`. Nodes outside any choice are always active.
pub fn case_active(schema: &Schema, tree: &ConfigTree, parent: NodeId, id: SchemaId) -> bool {
    schema
        .case_chain(id)
        .into_iter()
        .all(|(case, choice)| case_state(schema, tree, parent, choice, case, &[]) == CaseState::Active)
}

/// Children of `parent` that belong to a case other than the one
/// `candidate` lives in, for any choice enclosing `candidate`.
pub fn conflicting_siblings(
    schema: &Schema,
    tree: &ConfigTree,
    parent: NodeId,
    candidate: SchemaId,
) -> Vec<NodeId> {
    let chain = schema.case_chain(candidate);
    tree.children(parent)
        .iter()
        .copied()
        .filter(|sibling| {
            tree.schema_id(*sibling).is_some_and(|sid| {
                chain.iter().any(|(case, choice)| {
                    schema
                        .case_in_choice(sid, *choice)
                        .is_some_and(|other| other != *case)
                })
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseState {
    Active,
    Conflicting,
    Inactive,
}

fn case_state(
    schema: &Schema,
    tree: &ConfigTree,
    parent: NodeId,
    choice: SchemaId,
    case: SchemaId,
    leaving: &[NodeId],
) -> CaseState {
    let mut conflicting = false;
    for sibling in tree.children(parent).iter().filter(|s| !leaving.contains(s)) {
        let Some(sid) = tree.schema_id(*sibling) else {
            continue;
        };
        match schema.case_in_choice(sid, choice) {
            Some(found) if found == case => return CaseState::Active,
            Some(_) => conflicting = true,
            None => {},
        }
    }
    if conflicting {
        CaseState::Conflicting
    } else {
        CaseState::Inactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yconf_core::{LeafType, SchemaBuilder};

    /// top { choice transport (default tcp) { case tcp { port = 80 } case udp { size = 512; ttl } } timeout = 30 }
    fn schema() -> Arc<Schema> {
        let mut b = SchemaBuilder::new("urn:t");
        let top = b.container(b.root(), "top");
        let transport = b.choice(top, "transport");
        let tcp = b.case(transport, "tcp");
        let port = b.leaf(tcp, "port", LeafType::Uint16);
        b.set_default(port, "80");
        let udp = b.case(transport, "udp");
        let size = b.leaf(udp, "size", LeafType::Uint16);
        b.set_default(size, "512");
        b.leaf(udp, "ttl", LeafType::Uint8);
        b.set_default_case(transport, tcp);
        let timeout = b.leaf(top, "timeout", LeafType::Uint32);
        b.set_default(timeout, "30");
        Arc::new(b.build().unwrap())
    }

    fn names(tree: &ConfigTree, node: NodeId) -> Vec<String> {
        tree.children(node)
            .iter()
            .map(|c| tree.qname(*c).name().to_string())
            .collect()
    }

    #[test]
    fn test_fills_default_case_and_plain_leaves() {
        let schema = schema();
        let mut tree = ConfigTree::new(schema.clone());
        let mut changes = ConfigTree::new(schema);
        let (root, changes_root) = (tree.root(), changes.root());

        assert!(fill_defaults(&mut tree, root, &mut changes, changes_root));

        let top = tree.children(tree.root())[0];
        assert_eq!(names(&tree, top), vec!["port", "timeout"]);
        assert!(tree.deep_eq(&changes));
    }

    #[test]
    fn test_active_case_wins_over_default_case() {
        let schema = schema();
        let mut tree = ConfigTree::from_json(schema.clone(), r#"{"top": {"ttl": 4}}"#).unwrap();
        let mut changes = ConfigTree::new(schema);
        let (root, changes_root) = (tree.root(), changes.root());

        assert!(fill_defaults(&mut tree, root, &mut changes, changes_root));

        let top = tree.children(tree.root())[0];
        assert_eq!(names(&tree, top), vec!["ttl", "size", "timeout"]);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let schema = schema();
        let mut tree = ConfigTree::new(schema.clone());
        let mut changes = ConfigTree::new(schema.clone());
        let (root, changes_root) = (tree.root(), changes.root());
        fill_defaults(&mut tree, root, &mut changes, changes_root);

        let mut again = ConfigTree::new(schema);
        let again_root = again.root();
        assert!(!fill_defaults(&mut tree, root, &mut again, again_root));
        assert!(again.is_empty());
    }

    #[test]
    fn test_default_allowed_ignores_leaving_nodes() {
        let schema = schema();
        let tree = ConfigTree::from_json(schema.clone(), r#"{"top": {"size": 512, "ttl": 4}}"#).unwrap();
        let top = tree.children(tree.root())[0];
        let top_schema = tree.schema_id(top).unwrap();
        let size = schema.find_child_by_name(top_schema, "size").unwrap();
        let port = schema.find_child_by_name(top_schema, "port").unwrap();
        let leaving = tree.children(top).to_vec();

        assert!(default_allowed(&schema, &tree, top, size));
        assert!(!default_allowed(&schema, &tree, top, port));
        assert!(!default_allowed_without(&schema, &tree, top, size, &leaving));
        assert!(default_allowed_without(&schema, &tree, top, port, &leaving));
        assert!(default_allowed_without(&schema, &tree, top, size, &leaving[1..]));
    }

    #[test]
    fn test_conflicting_siblings() {
        let schema = schema();
        let tree = ConfigTree::from_json(schema.clone(), r#"{"top": {"port": 22, "timeout": 5}}"#).unwrap();
        let top = tree.children(tree.root())[0];
        let top_schema = tree.schema_id(top).unwrap();
        let ttl = schema.find_child_by_name(top_schema, "ttl").unwrap();
        let timeout = schema.find_child_by_name(top_schema, "timeout").unwrap();

        assert_eq!(conflicting_siblings(&schema, &tree, top, ttl), vec![tree.children(top)[0]]);
        assert!(conflicting_siblings(&schema, &tree, top, timeout).is_empty());
        assert!(!case_active(&schema, &tree, top, ttl));
        assert!(case_active(&schema, &tree, top, timeout));
    }
}
