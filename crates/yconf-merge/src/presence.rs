//! Instance matching between a delta and a configuration tree.

use yconf_core::{ConfigTree, NodeId, QName, Result, Schema, SchemaId, SchemaKind, YconfError};

/// Whether the instance named by a delta node exists in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPresence {
    /// No matching instance.
    Missing,
    /// Exactly one identifiable instance.
    Exists(NodeId),
    /// The delta names a list or leaf-list without keys or value, which
    /// denotes every instance of that name.
    ExistsUnkeyed,
}

impl DataPresence {
    /// Returns true unless the instance is missing.
    pub fn exists(&self) -> bool {
        !matches!(self, Self::Missing)
    }
}

/// Looks for the instance described by `node` (in `source`) among the
/// children of `parent` (in `target`).
///
/// Lists match on every key leaf, leaf-lists on their value, both compared
/// in canonical form. Any other kind matches on name alone since it can
/// only exist once.
pub fn check_data_presence(
    schema: &Schema,
    schema_id: SchemaId,
    source: &ConfigTree,
    node: NodeId,
    target: &ConfigTree,
    parent: NodeId,
) -> Result<DataPresence> {
    let qname = source.qname(node);
    let kind = schema.kind(schema_id);
    if kind.is_multi_instance() && source.children(node).is_empty() && is_blank(source.value(node)) {
        return Ok(DataPresence::ExistsUnkeyed);
    }

    let found = match kind {
        SchemaKind::List => {
            let keys = list_keys(schema, schema_id, source, node)?;
            find_entry(schema, target, parent, qname, &keys)
        },
        SchemaKind::LeafList => {
            let value = canonical_value(schema, schema_id, source, node)?;
            target
                .children_named(parent, qname)
                .find(|entry| {
                    target
                        .value(*entry)
                        .is_some_and(|v| schema.canonical(schema_id, v) == value)
                })
        },
        _ => target.find_child(parent, qname),
    };
    Ok(found.map_or(DataPresence::Missing, DataPresence::Exists))
}

/// Extracts the canonical key values of a list entry, in key order.
///
/// A missing key leaf is an `InvalidValue` error located at the entry.
pub fn list_keys(
    schema: &Schema,
    list: SchemaId,
    tree: &ConfigTree,
    entry: NodeId,
) -> Result<Vec<(SchemaId, QName, String)>> {
    schema
        .key_leaf_ids(list)
        .into_iter()
        .map(|key_id| {
            let key_name = schema.node(key_id).qname.clone();
            let raw = tree
                .find_child(entry, &key_name)
                .and_then(|leaf| tree.value(leaf))
                .ok_or_else(|| {
                    YconfError::invalid_value(
                        tree.path(entry),
                        format!("missing key leaf '{}'", key_name),
                    )
                })?;
            let value = schema
                .parse_value(key_id, raw)
                .map_err(|e| YconfError::invalid_value(tree.path(entry), e))?;
            Ok((key_id, key_name, value))
        })
        .collect()
}

fn find_entry(
    schema: &Schema,
    target: &ConfigTree,
    parent: NodeId,
    qname: &QName,
    keys: &[(SchemaId, QName, String)],
) -> Option<NodeId> {
    target.children_named(parent, qname).find(|entry| {
        keys.iter().all(|(key_id, key_name, expected)| {
            target
                .find_child(*entry, key_name)
                .and_then(|leaf| target.value(leaf))
                .is_some_and(|actual| schema.canonical(*key_id, actual) == *expected)
        })
    })
}

fn canonical_value(
    schema: &Schema,
    schema_id: SchemaId,
    tree: &ConfigTree,
    node: NodeId,
) -> Result<String> {
    let raw = tree.value(node).unwrap_or_default();
    schema
        .parse_value(schema_id, raw)
        .map_err(|e| YconfError::invalid_value(tree.path(node), e))
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}
