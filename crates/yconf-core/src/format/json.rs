use serde_json::{Map, Number, Value};
use std::sync::Arc;

use crate::error::{Result, YconfError};
use crate::format::{FormatParser, FormatSerializer};
use crate::schema::{LeafType, Schema, SchemaId};
use crate::tree::{ConfigTree, NodeId};
use crate::types::{NETCONF_BASE_NS, OPERATION_ATTR, QName};

/// Metadata key carrying the attributes of the enclosing object.
const META: &str = "@";

/// Module prefix accepted as an alias of the NETCONF base namespace.
const NETCONF_PREFIX: &str = "ietf-netconf";

pub struct JsonFormat;

impl FormatParser for JsonFormat {
    fn parse(&self, schema: &Arc<Schema>, input: &str) -> Result<ConfigTree> {
        ConfigTree::from_json(schema.clone(), input)
    }
}

impl FormatSerializer for JsonFormat {
    fn serialize(&self, tree: &ConfigTree) -> Result<String> {
        tree.to_json()
    }
}

impl ConfigTree {
    /// Parses a JSON document into a tree bound to `schema`.
    ///
    /// Member names resolve against the schema by local name, or by Clark
    /// notation (`{urn:ns}name`) when two namespaces share a local name.
    /// Names the schema does not know are kept unbound, so that the merge
    /// engine can reject them with a proper path.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use yconf_core::{ConfigTree, LeafType, QName, SchemaBuilder};
    ///
    /// let mut b = SchemaBuilder::new("urn:example:car");
    /// let car = b.container(b.root(), "car");
    /// b.leaf(car, "brand", LeafType::String);
    /// let schema = Arc::new(b.build().unwrap());
    ///
    /// let tree = ConfigTree::from_json(
    ///     schema,
    ///     r#"{"car": {"@": {"operation": "replace"}, "brand": "Toyota"}}"#,
    /// ).unwrap();
    /// let car = tree.children(tree.root())[0];
    /// assert_eq!(tree.attribute(car, &QName::operation()), Some("replace"));
    /// ```
    pub fn from_json(schema: Arc<Schema>, json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| YconfError::parse_error_with_cause("json_source", e.to_string(), e))?;
        Self::from_value(schema, &value)
    }

    /// Builds a tree from an already parsed JSON value.
    pub fn from_value(schema: Arc<Schema>, value: &Value) -> Result<Self> {
        let mut tree = ConfigTree::new(schema);
        match value {
            Value::Object(members) => {
                let root = tree.root();
                decode_members(&mut tree, root, members)?;
            },
            Value::Null => {},
            _ => {
                return Err(YconfError::parse_error(
                    "json_source",
                    "top-level value must be an object",
                ));
            },
        }
        Ok(tree)
    }

    /// Serializes the tree to a JSON string (pretty printed).
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_value())
            .map_err(|e| YconfError::parse_error("json_target", e.to_string()))
    }

    /// Converts the tree into a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(encode_children(self, self.root()))
    }

    /// Converts one subtree into a JSON value (the value of its member).
    pub fn subtree_to_value(&self, id: NodeId) -> Value {
        encode_instance(self, id)
    }
}

// ============================================
// Decoding
// ============================================

fn decode_members(tree: &mut ConfigTree, parent: NodeId, members: &Map<String, Value>) -> Result<()> {
    for (key, value) in members {
        if key == META {
            apply_attributes(tree, parent, value)?;
            continue;
        }
        if key.starts_with('@') {
            continue;
        }
        let (qname, schema) = resolve_member(tree, parent, key);
        match value {
            Value::Array(items) => {
                for item in items {
                    decode_instance(tree, parent, &qname, schema, item)?;
                }
            },
            other => decode_instance(tree, parent, &qname, schema, other)?,
        }
    }

    // Leaf metadata (`"@brand": {...}`) refers to siblings decoded above.
    for (key, value) in members {
        let Some(name) = key.strip_prefix('@').filter(|n| !n.is_empty()) else {
            continue;
        };
        let (qname, _) = resolve_member(tree, parent, name);
        let targets: Vec<NodeId> = tree.children_named(parent, &qname).collect();
        if targets.is_empty() {
            return Err(YconfError::parse_error(
                "json_source",
                format!("metadata '{}' has no matching member", key),
            ));
        }
        for target in targets {
            apply_attributes(tree, target, value)?;
        }
    }
    Ok(())
}

fn decode_instance(
    tree: &mut ConfigTree,
    parent: NodeId,
    qname: &QName,
    schema: Option<SchemaId>,
    value: &Value,
) -> Result<()> {
    match value {
        Value::Object(members) => {
            let node = tree.append_child(parent, qname.clone(), schema, None);
            decode_members(tree, node, members)
        },
        Value::Null => {
            let value = empty_leaf_value(tree, schema);
            tree.append_child(parent, qname.clone(), schema, value);
            Ok(())
        },
        Value::String(s) => {
            tree.append_child(parent, qname.clone(), schema, Some(s.clone()));
            Ok(())
        },
        Value::Number(n) => {
            tree.append_child(parent, qname.clone(), schema, Some(n.to_string()));
            Ok(())
        },
        Value::Bool(b) => {
            tree.append_child(parent, qname.clone(), schema, Some(b.to_string()));
            Ok(())
        },
        // `[null]` is how RFC 7951 spells a leaf of type empty.
        Value::Array(items) if items.len() == 1 && items[0].is_null() => {
            let value = empty_leaf_value(tree, schema);
            tree.append_child(parent, qname.clone(), schema, value);
            Ok(())
        },
        Value::Array(_) => Err(YconfError::parse_error(
            "json_source",
            format!("nested array under '{}'", qname),
        )),
    }
}

/// Leaves of type `empty` hold an empty value; every other null is bare.
fn empty_leaf_value(tree: &ConfigTree, schema: Option<SchemaId>) -> Option<String> {
    schema
        .map(|id| tree.schema().node(id))
        .filter(|node| node.is_empty_type())
        .map(|_| String::new())
}

fn resolve_member(tree: &ConfigTree, parent: NodeId, key: &str) -> (QName, Option<SchemaId>) {
    let schema = tree.schema();
    let parent_schema = tree.schema_id(parent);
    if let Some((namespace, name)) = parse_clark(key) {
        let qname = QName::new(namespace, name);
        let id = parent_schema.and_then(|p| schema.find_child(p, &qname));
        return (qname, id);
    }
    match parent_schema.and_then(|p| schema.find_child_by_name(p, key)) {
        Some(id) => (schema.node(id).qname.clone(), Some(id)),
        None => (QName::new(tree.qname(parent).namespace(), key), None),
    }
}

fn parse_clark(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix('{')?;
    rest.split_once('}')
}

fn apply_attributes(tree: &mut ConfigTree, node: NodeId, value: &Value) -> Result<()> {
    let Value::Object(attrs) = value else {
        return Err(YconfError::parse_error(
            "json_source",
            "metadata must be an object",
        ));
    };
    for (key, value) in attrs {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                return Err(YconfError::parse_error(
                    "json_source",
                    format!("attribute '{}' must be a scalar", key),
                ));
            },
        };
        tree.set_attribute(node, attribute_name(key), text);
    }
    Ok(())
}

fn attribute_name(key: &str) -> QName {
    if let Some((namespace, name)) = parse_clark(key) {
        return QName::new(namespace, name);
    }
    match key.split_once(':') {
        Some((NETCONF_PREFIX, name)) => QName::new(NETCONF_BASE_NS, name),
        None if key == OPERATION_ATTR => QName::operation(),
        _ => QName::local(key),
    }
}

// ============================================
// Encoding
// ============================================

fn encode_children(tree: &ConfigTree, parent: NodeId) -> Map<String, Value> {
    let mut members = Map::new();
    if parent == tree.root() || !tree.children(parent).is_empty() || tree.value(parent).is_none() {
        let attrs = encode_attributes(tree, parent);
        if !attrs.is_empty() {
            members.insert(META.to_string(), Value::Object(attrs));
        }
    }

    let parent_ns = tree.qname(parent).namespace().to_string();
    let mut groups: Vec<(QName, Vec<NodeId>)> = Vec::new();
    for child in tree.children(parent) {
        let qname = tree.qname(*child);
        match groups.iter_mut().find(|(name, _)| name == qname) {
            Some((_, ids)) => ids.push(*child),
            None => groups.push((qname.clone(), vec![*child])),
        }
    }

    for (qname, ids) in groups {
        let key = if qname.namespace() == parent_ns {
            qname.name().to_string()
        } else {
            qname.clark()
        };
        let multi = ids.len() > 1
            || tree
                .kind(ids[0])
                .is_some_and(|kind| kind.is_multi_instance());
        let value = if multi {
            Value::Array(ids.iter().map(|id| encode_instance(tree, *id)).collect())
        } else {
            encode_instance(tree, ids[0])
        };

        // Leaves cannot hold an "@" member, so their attributes go to a sibling.
        let leaf_attrs = ids
            .iter()
            .find(|id| is_scalar(tree, **id))
            .map(|id| encode_attributes(tree, *id))
            .filter(|attrs| !attrs.is_empty());
        members.insert(key.clone(), value);
        if let Some(attrs) = leaf_attrs {
            members.insert(format!("@{}", key), Value::Object(attrs));
        }
    }
    members
}

fn is_scalar(tree: &ConfigTree, id: NodeId) -> bool {
    tree.children(id).is_empty()
        && (tree.value(id).is_some() || tree.kind(id).is_some_and(|k| k.is_leafy()))
}

fn encode_instance(tree: &ConfigTree, id: NodeId) -> Value {
    if is_scalar(tree, id) {
        return encode_scalar(tree, id);
    }
    Value::Object(encode_children(tree, id))
}

fn encode_scalar(tree: &ConfigTree, id: NodeId) -> Value {
    let leaf_type = tree.schema_node(id).and_then(|s| s.leaf_type.as_ref());
    let Some(text) = tree.value(id) else {
        return match leaf_type {
            Some(LeafType::Empty) => Value::Array(vec![Value::Null]),
            _ => Value::Null,
        };
    };
    match leaf_type {
        Some(LeafType::Empty) => Value::Array(vec![Value::Null]),
        Some(LeafType::Boolean) => match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        },
        Some(ty) if ty.is_numeric() => text
            .parse::<i64>()
            .map(Number::from)
            .or_else(|_| text.parse::<u64>().map(Number::from))
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        _ => Value::String(text.to_string()),
    }
}

fn encode_attributes(tree: &ConfigTree, id: NodeId) -> Map<String, Value> {
    tree.attributes(id)
        .map(|(name, value)| {
            let key = if name.namespace() == NETCONF_BASE_NS {
                if name.name() == OPERATION_ATTR {
                    OPERATION_ATTR.to_string()
                } else {
                    format!("{}:{}", NETCONF_PREFIX, name.name())
                }
            } else {
                name.clark()
            };
            (key, Value::String(value.to_string()))
        })
        .collect()
}
