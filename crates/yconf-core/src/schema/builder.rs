use indexmap::map::Entry;

use super::{LeafType, Schema, SchemaId, SchemaKind, SchemaNode};
use crate::error::{Result, YconfError};
use crate::types::QName;

/// Builder for [`Schema`].
///
/// Nodes are added under a parent id; adding a data node under a choice
/// creates an implicit case of the same name, as YANG's shorthand does.
/// Consistency (key leaves, default cases, default values) is checked by
/// [`SchemaBuilder::build`].
#[derive(Debug)]
pub struct SchemaBuilder {
    nodes: Vec<SchemaNode>,
    namespace: String,
    problems: Vec<String>,
}

impl SchemaBuilder {
    /// Creates a builder whose nodes live in `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let root = SchemaNode::new(SchemaKind::Root, QName::new(namespace.clone(), ""), None);
        Self {
            nodes: vec![root],
            namespace,
            problems: Vec::new(),
        }
    }

    /// Returns the schema root.
    pub fn root(&self) -> SchemaId {
        SchemaId(0)
    }

    /// Switches the namespace used for nodes added from now on.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = namespace.into();
        self
    }

    /// Adds a non-presence container.
    pub fn container(&mut self, parent: SchemaId, name: &str) -> SchemaId {
        self.add(parent, SchemaKind::Container, name)
    }

    /// Adds a presence container.
    pub fn presence_container(&mut self, parent: SchemaId, name: &str) -> SchemaId {
        let id = self.add(parent, SchemaKind::Container, name);
        self.nodes[id.0].is_presence = true;
        id
    }

    /// Adds a list keyed by the named leaves. The key leaves must be added
    /// as children of the list before [`build`](Self::build).
    pub fn list(&mut self, parent: SchemaId, name: &str, keys: &[&str]) -> SchemaId {
        let id = self.add(parent, SchemaKind::List, name);
        let namespace = self.nodes[id.0].qname.namespace().to_string();
        self.nodes[id.0].key_leaves = keys
            .iter()
            .map(|key| QName::new(namespace.clone(), *key))
            .collect();
        id
    }

    /// Adds a leaf.
    pub fn leaf(&mut self, parent: SchemaId, name: &str, leaf_type: LeafType) -> SchemaId {
        let id = self.add(parent, SchemaKind::Leaf, name);
        self.nodes[id.0].leaf_type = Some(leaf_type);
        id
    }

    /// Adds a leaf-list.
    pub fn leaf_list(&mut self, parent: SchemaId, name: &str, leaf_type: LeafType) -> SchemaId {
        let id = self.add(parent, SchemaKind::LeafList, name);
        self.nodes[id.0].leaf_type = Some(leaf_type);
        id
    }

    /// Adds a choice.
    pub fn choice(&mut self, parent: SchemaId, name: &str) -> SchemaId {
        self.add(parent, SchemaKind::Choice, name)
    }

    /// Adds a case to a choice.
    pub fn case(&mut self, choice: SchemaId, name: &str) -> SchemaId {
        if self.nodes[choice.0].kind != SchemaKind::Choice {
            self.problems
                .push(format!("case '{}' must be added under a choice", name));
        }
        self.add(choice, SchemaKind::Case, name)
    }

    /// Adds an rpc. Its `input` and `output` are added with [`rpc_io`](Self::rpc_io).
    pub fn rpc(&mut self, parent: SchemaId, name: &str) -> SchemaId {
        self.add(parent, SchemaKind::Rpc, name)
    }

    /// Adds the `input` or `output` statement of an rpc.
    pub fn rpc_io(&mut self, rpc: SchemaId, name: &str) -> SchemaId {
        self.add(rpc, SchemaKind::RpcIo, name)
    }

    /// Adds a notification.
    pub fn notification(&mut self, parent: SchemaId, name: &str) -> SchemaId {
        self.add(parent, SchemaKind::Notification, name)
    }

    /// Adds an anyxml node.
    pub fn anyxml(&mut self, parent: SchemaId, name: &str) -> SchemaId {
        self.add(parent, SchemaKind::AnyXml, name)
    }

    /// Sets the default value of a leaf.
    pub fn set_default(&mut self, leaf: SchemaId, value: impl Into<String>) -> &mut Self {
        self.nodes[leaf.0].default_value = Some(value.into());
        self
    }

    /// Marks a leaf mandatory.
    pub fn set_mandatory(&mut self, leaf: SchemaId) -> &mut Self {
        self.nodes[leaf.0].is_mandatory = true;
        self
    }

    /// Declares the default case of a choice.
    pub fn set_default_case(&mut self, choice: SchemaId, case: SchemaId) -> &mut Self {
        self.nodes[choice.0].default_case = Some(case);
        self
    }

    pub(crate) fn case_of(&self, id: SchemaId) -> Option<SchemaId> {
        self.nodes[id.0].case_of
    }

    /// Checks the schema for consistency and freezes it.
    pub fn build(mut self) -> Result<Schema> {
        if !self.problems.is_empty() {
            return Err(YconfError::schema(self.problems.join("; ")));
        }
        for index in 0..self.nodes.len() {
            self.check_node(SchemaId(index))?;
        }
        // Children are always allocated after their parents, so a reverse
        // sweep sees every child before its parent.
        for index in (0..self.nodes.len()).rev() {
            let node = &self.nodes[index];
            let carries = matches!(node.kind, SchemaKind::Container | SchemaKind::Root)
                && !node.is_presence
                && node.children.values().any(|child| {
                    let child = &self.nodes[child.0];
                    child.default_value.is_some() || child.has_descendant_default
                });
            self.nodes[index].has_descendant_default = carries;
        }
        Ok(Schema::from_nodes(self.nodes))
    }

    fn check_node(&mut self, id: SchemaId) -> Result<()> {
        let node = &self.nodes[id.0];
        let name = node.qname.clone();
        match node.kind {
            SchemaKind::List => {
                if node.key_leaves.is_empty() {
                    return Err(YconfError::schema(format!("list '{}' has no key", name)));
                }
                for key in &node.key_leaves {
                    let is_leaf = node
                        .children
                        .get(key)
                        .is_some_and(|child| self.nodes[child.0].kind == SchemaKind::Leaf);
                    if !is_leaf {
                        return Err(YconfError::schema(format!(
                            "key '{}' of list '{}' is not a leaf of the list",
                            key, name
                        )));
                    }
                }
            },
            SchemaKind::Choice => {
                if let Some(case) = node.default_case {
                    let case = &self.nodes[case.0];
                    if case.kind != SchemaKind::Case || case.choice_of != Some(id) {
                        return Err(YconfError::schema(format!(
                            "default case of choice '{}' is not one of its cases",
                            name
                        )));
                    }
                }
            },
            _ => {},
        }

        if let Some(default) = node.default_value.clone() {
            if node.kind != SchemaKind::Leaf {
                return Err(YconfError::schema(format!(
                    "only leaves may declare a default ('{}')",
                    name
                )));
            }
            if node.is_mandatory {
                return Err(YconfError::schema(format!(
                    "leaf '{}' cannot be both mandatory and defaulted",
                    name
                )));
            }
            let canonical = node
                .leaf_type
                .as_ref()
                .map(|ty| ty.parse(&default))
                .transpose()
                .map_err(|e| YconfError::schema(format!("default of '{}': {}", name, e)))?;
            self.nodes[id.0].default_value = canonical;
        }
        Ok(())
    }

    fn add(&mut self, parent: SchemaId, kind: SchemaKind, name: &str) -> SchemaId {
        let parent_kind = self.nodes[parent.0].kind;
        // Shorthand case: a data node placed directly under a choice.
        let parent = if parent_kind == SchemaKind::Choice && kind != SchemaKind::Case {
            self.add(parent, SchemaKind::Case, name)
        } else {
            parent
        };

        let id = SchemaId(self.nodes.len());
        let qname = QName::new(self.namespace.clone(), name);
        let mut node = SchemaNode::new(kind, qname.clone(), Some(parent));
        match self.nodes[parent.0].kind {
            SchemaKind::Choice => node.choice_of = Some(parent),
            SchemaKind::Case => node.case_of = Some(parent),
            _ => {},
        }
        self.nodes.push(node);

        if !matches!(kind, SchemaKind::Choice | SchemaKind::Case) {
            let data_parent = self.data_parent_of(parent);
            match self.nodes[data_parent.0].children.entry(qname) {
                Entry::Occupied(entry) => self
                    .problems
                    .push(format!("duplicate data node '{}'", entry.key())),
                Entry::Vacant(entry) => {
                    entry.insert(id);
                },
            }
        }
        id
    }

    fn data_parent_of(&self, mut id: SchemaId) -> SchemaId {
        while matches!(self.nodes[id.0].kind, SchemaKind::Choice | SchemaKind::Case) {
            match self.nodes[id.0].parent {
                Some(parent) => id = parent,
                None => break,
            }
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendant_default_propagates_through_containers() {
        let mut b = SchemaBuilder::new("urn:t");
        let outer = b.container(b.root(), "outer");
        let inner = b.container(outer, "inner");
        let leaf = b.leaf(inner, "mtu", LeafType::Uint16);
        b.set_default(leaf, "1500");
        let pres = b.presence_container(outer, "opt");
        let hidden = b.leaf(pres, "x", LeafType::String);
        b.set_default(hidden, "y");
        let schema = b.build().unwrap();

        assert!(schema.node(outer).has_descendant_default);
        assert!(schema.node(inner).has_descendant_default);
        assert!(!schema.node(pres).has_descendant_default);
    }

    #[test]
    fn test_shorthand_case_is_created() {
        let mut b = SchemaBuilder::new("urn:t");
        let ch = b.choice(b.root(), "addr");
        let leaf = b.leaf(ch, "dhcp", LeafType::Empty);
        let schema = b.build().unwrap();

        let case = schema.node(leaf).case_of.unwrap();
        assert_eq!(schema.kind(case), SchemaKind::Case);
        assert_eq!(schema.node(case).qname.name(), "dhcp");
        assert_eq!(schema.node(case).choice_of, Some(ch));
    }

    #[test]
    fn test_default_is_canonicalized() {
        let mut b = SchemaBuilder::new("urn:t");
        let leaf = b.leaf(b.root(), "n", LeafType::Uint8);
        b.set_default(leaf, "010");
        let schema = b.build().unwrap();
        assert_eq!(schema.node(leaf).default_value.as_deref(), Some("10"));
    }

    #[test]
    fn test_invalid_default_rejected() {
        let mut b = SchemaBuilder::new("urn:t");
        let leaf = b.leaf(b.root(), "n", LeafType::Uint8);
        b.set_default(leaf, "300");
        assert!(matches!(b.build(), Err(YconfError::Schema(_))));
    }

    #[test]
    fn test_missing_key_leaf_rejected() {
        let mut b = SchemaBuilder::new("urn:t");
        let list = b.list(b.root(), "user", &["name"]);
        b.leaf(list, "uid", LeafType::Uint32);
        assert!(b.build().is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut b = SchemaBuilder::new("urn:t");
        let ch = b.choice(b.root(), "c");
        let one = b.case(ch, "one");
        b.leaf(one, "x", LeafType::String);
        let two = b.case(ch, "two");
        b.leaf(two, "x", LeafType::String);
        assert!(b.build().is_err());
    }

    #[test]
    fn test_same_name_other_namespace_allowed() {
        let mut b = SchemaBuilder::new("urn:a");
        let top = b.container(b.root(), "top");
        b.leaf(top, "x", LeafType::String);
        b.set_namespace("urn:b");
        b.leaf(top, "x", LeafType::String);
        let schema = b.build().unwrap();
        assert!(schema.find_child(top, &QName::new("urn:b", "x")).is_some());
        assert!(schema.find_child(top, &QName::new("urn:a", "x")).is_some());
    }
}
