//! Read-only schema model.
//!
//! A [`Schema`] is an arena of [`SchemaNode`]s built once (through
//! [`SchemaBuilder`] or a module description) and shared by reference
//! across every tree and merge. Choice and case statements live in the
//! arena but are transparent for data: a leaf inside a case is a data
//! child of the container that holds the choice, and records its case in
//! [`SchemaNode::case_of`].

use indexmap::IndexMap;
use std::fmt;

use crate::types::QName;

mod builder;
mod def;
mod leaf_type;

pub use builder::SchemaBuilder;
pub use def::{ModuleDef, NodeDef, ScalarDef};
pub use leaf_type::LeafType;

/// Index of a node in its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    /// Returns the arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// YANG statement kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Root,
    Container,
    List,
    Leaf,
    LeafList,
    Choice,
    Case,
    Rpc,
    /// The `input` or `output` of an rpc.
    RpcIo,
    Notification,
    AnyXml,
    NotApplicable,
}

impl SchemaKind {
    /// Leafy nodes carry a text value and no element children.
    pub fn is_leafy(&self) -> bool {
        matches!(self, Self::Leaf | Self::LeafList)
    }

    /// Returns true for nodes that can appear more than once under a parent.
    pub fn is_multi_instance(&self) -> bool {
        matches!(self, Self::List | Self::LeafList)
    }

    /// Returns the YANG keyword of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Container => "container",
            Self::List => "list",
            Self::Leaf => "leaf",
            Self::LeafList => "leaf-list",
            Self::Choice => "choice",
            Self::Case => "case",
            Self::Rpc => "rpc",
            Self::RpcIo => "rpc-io",
            Self::Notification => "notification",
            Self::AnyXml => "anyxml",
            Self::NotApplicable => "not-applicable",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable facts about one schema statement.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub qname: QName,
    /// Statement parent; for data nodes inside a case this is the case.
    pub parent: Option<SchemaId>,
    pub default_value: Option<String>,
    /// True for non-presence containers with a default somewhere below.
    pub has_descendant_default: bool,
    pub is_presence: bool,
    pub is_mandatory: bool,
    pub key_leaves: Vec<QName>,
    /// For a case: the choice it belongs to.
    pub choice_of: Option<SchemaId>,
    /// For a data node or nested choice: the innermost enclosing case.
    pub case_of: Option<SchemaId>,
    /// For a choice: its default case.
    pub default_case: Option<SchemaId>,
    pub leaf_type: Option<LeafType>,
    pub(crate) children: IndexMap<QName, SchemaId>,
}

impl SchemaNode {
    pub(crate) fn new(kind: SchemaKind, qname: QName, parent: Option<SchemaId>) -> Self {
        Self {
            kind,
            qname,
            parent,
            default_value: None,
            has_descendant_default: false,
            is_presence: false,
            is_mandatory: false,
            key_leaves: Vec::new(),
            choice_of: None,
            case_of: None,
            default_case: None,
            leaf_type: None,
            children: IndexMap::new(),
        }
    }

    /// Returns true for leaves and leaf-lists.
    pub fn is_leafy(&self) -> bool {
        self.kind.is_leafy()
    }

    /// Returns the leafref path when the leaf type is a leafref.
    pub fn leafref_path(&self) -> Option<&str> {
        self.leaf_type.as_ref().and_then(LeafType::leafref_path)
    }

    /// Returns true when the leaf type is `empty`.
    pub fn is_empty_type(&self) -> bool {
        self.leaf_type.as_ref().is_some_and(LeafType::is_empty_type)
    }
}

/// An immutable, shareable schema.
///
/// # Example
///
/// ```
/// use yconf_core::{LeafType, QName, SchemaBuilder, SchemaKind};
///
/// let mut b = SchemaBuilder::new("urn:example:car");
/// let car = b.container(b.root(), "car");
/// b.leaf(car, "brand", LeafType::String);
/// let schema = b.build().unwrap();
///
/// let car = schema.find_child(schema.root(), &QName::new("urn:example:car", "car")).unwrap();
/// assert_eq!(schema.node(car).kind, SchemaKind::Container);
/// assert!(schema.find_child_by_name(car, "brand").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: Vec<SchemaNode>,
}

impl Schema {
    pub(crate) fn from_nodes(nodes: Vec<SchemaNode>) -> Self {
        Self { nodes }
    }

    /// Returns the schema root.
    pub fn root(&self) -> SchemaId {
        SchemaId(0)
    }

    /// Returns the node for `id`.
    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Returns the statement kind of `id`.
    pub fn kind(&self, id: SchemaId) -> SchemaKind {
        self.node(id).kind
    }

    /// Returns the number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the schema only holds its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterates the data children of `id` in definition order.
    pub fn children(&self, id: SchemaId) -> impl Iterator<Item = SchemaId> + '_ {
        self.node(id).children.values().copied()
    }

    /// Resolves a data child by qualified name, looking through choices
    /// and cases. Under an rpc, the parameters of its `input` resolve too.
    pub fn find_child(&self, parent: SchemaId, qname: &QName) -> Option<SchemaId> {
        let node = self.node(parent);
        node.children.get(qname).copied().or_else(|| {
            let input = self.rpc_input_of(parent)?;
            self.node(input).children.get(qname).copied()
        })
    }

    /// Resolves a data child by local name only.
    pub fn find_child_by_name(&self, parent: SchemaId, name: &str) -> Option<SchemaId> {
        let by_name = |id: SchemaId| {
            self.node(id)
                .children
                .iter()
                .find(|(qname, _)| qname.name() == name)
                .map(|(_, child)| *child)
        };
        by_name(parent).or_else(|| self.rpc_input_of(parent).and_then(by_name))
    }

    fn rpc_input_of(&self, id: SchemaId) -> Option<SchemaId> {
        if self.kind(id) == SchemaKind::Rpc {
            self.rpc_input(id)
        } else {
            None
        }
    }

    /// Returns the nearest ancestor that is a data node (not a choice or case).
    pub fn data_parent(&self, id: SchemaId) -> Option<SchemaId> {
        let mut current = self.node(id).parent?;
        while matches!(self.kind(current), SchemaKind::Choice | SchemaKind::Case) {
            current = self.node(current).parent?;
        }
        Some(current)
    }

    /// Returns true if `id` is a key leaf of its parent list.
    pub fn is_key_leaf(&self, id: SchemaId) -> bool {
        let node = self.node(id);
        if node.kind != SchemaKind::Leaf {
            return false;
        }
        match self.data_parent(id) {
            Some(parent) => {
                let parent = self.node(parent);
                parent.kind == SchemaKind::List && parent.key_leaves.contains(&node.qname)
            },
            None => false,
        }
    }

    /// Returns the key leaves of a list as schema ids, in key order.
    pub fn key_leaf_ids(&self, list: SchemaId) -> Vec<SchemaId> {
        self.node(list)
            .key_leaves
            .iter()
            .filter_map(|key| self.find_child(list, key))
            .collect()
    }

    /// Returns the enclosing `(case, choice)` pairs of `id`, innermost first.
    ///
    /// A node outside any choice has an empty chain.
    pub fn case_chain(&self, id: SchemaId) -> Vec<(SchemaId, SchemaId)> {
        let mut chain = Vec::new();
        let mut case = self.node(id).case_of;
        while let Some(case_id) = case {
            let Some(choice_id) = self.node(case_id).choice_of else {
                break;
            };
            chain.push((case_id, choice_id));
            case = self.node(choice_id).case_of;
        }
        chain
    }

    /// Returns the case of `choice` that `id` belongs to, if any.
    pub fn case_in_choice(&self, id: SchemaId, choice: SchemaId) -> Option<SchemaId> {
        self.case_chain(id)
            .into_iter()
            .find(|(_, ch)| *ch == choice)
            .map(|(case, _)| case)
    }

    /// Returns the `input` statement of an rpc.
    pub fn rpc_input(&self, rpc: SchemaId) -> Option<SchemaId> {
        self.children(rpc).find(|child| {
            let node = self.node(*child);
            node.kind == SchemaKind::RpcIo && node.qname.name() == "input"
        })
    }

    /// Validates `text` against the type of leaf `id` and returns its
    /// canonical form.
    pub fn parse_value(&self, id: SchemaId, text: &str) -> Result<String, String> {
        match &self.node(id).leaf_type {
            Some(ty) => ty.parse(text),
            None => Err(format!("'{}' is not a leaf", self.node(id).qname)),
        }
    }

    /// Canonical form of `text`, falling back to the raw text when it does
    /// not parse.
    pub fn canonical(&self, id: SchemaId, text: &str) -> String {
        self.parse_value(id, text)
            .unwrap_or_else(|_| text.to_string())
    }
}
