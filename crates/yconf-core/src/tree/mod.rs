//! Configuration trees.
//!
//! A [`ConfigTree`] owns its nodes in an arena; children and parents are
//! referenced through [`NodeId`] indices, so parent links never own
//! anything. Removing a node only detaches it: the slot stays in the arena
//! until the tree is dropped or copied.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::path::{DataPath, PathSegment};
use crate::schema::{Schema, SchemaId, SchemaKind, SchemaNode};
use crate::types::QName;

mod search;

/// Index of a node inside its [`ConfigTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    qname: QName,
    schema: Option<SchemaId>,
    value: Option<String>,
    attributes: IndexMap<QName, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(qname: QName, schema: Option<SchemaId>, parent: Option<NodeId>) -> Self {
        Self {
            qname,
            schema,
            value: None,
            attributes: IndexMap::new(),
            parent,
            children: Vec::new(),
        }
    }
}

/// A configuration document bound to a [`Schema`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use yconf_core::{ConfigTree, LeafType, SchemaBuilder};
///
/// let mut b = SchemaBuilder::new("urn:example:car");
/// let car = b.container(b.root(), "car");
/// let brand = b.leaf(car, "brand", LeafType::String);
/// let schema = Arc::new(b.build().unwrap());
///
/// let mut tree = ConfigTree::new(schema);
/// let car_node = tree.create_child(tree.root(), car, None);
/// let brand_node = tree.create_child(car_node, brand, Some("Toyota".into()));
///
/// assert_eq!(tree.value(brand_node), Some("Toyota"));
/// assert_eq!(tree.parent(brand_node), Some(car_node));
/// assert_eq!(tree.path(brand_node).to_string(), "/car/brand");
/// ```
#[derive(Debug, Clone)]
pub struct ConfigTree {
    schema: Arc<Schema>,
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl ConfigTree {
    /// Creates an empty document.
    pub fn new(schema: Arc<Schema>) -> Self {
        let root_schema = schema.root();
        let root = NodeData::new(schema.node(root_schema).qname.clone(), Some(root_schema), None);
        Self {
            schema,
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Returns the schema this tree is bound to.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the document root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns true if the root has no children.
    pub fn is_empty(&self) -> bool {
        self.nodes[self.root.0].children.is_empty()
    }

    /// Counts the nodes reachable from the root, root excluded.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let children = self.children(id);
            count += children.len();
            stack.extend_from_slice(children);
        }
        count
    }

    // ============================================
    // Node accessors
    // ============================================

    /// Returns the qualified name of a node.
    pub fn qname(&self, id: NodeId) -> &QName {
        &self.nodes[id.0].qname
    }

    /// Returns the schema node a tree node is bound to.
    pub fn schema_id(&self, id: NodeId) -> Option<SchemaId> {
        self.nodes[id.0].schema
    }

    /// Returns the schema facts of a tree node.
    pub fn schema_node(&self, id: NodeId) -> Option<&SchemaNode> {
        self.schema_id(id).map(|s| self.schema.node(s))
    }

    /// Returns the statement kind of a tree node.
    pub fn kind(&self, id: NodeId) -> Option<SchemaKind> {
        self.schema_node(id).map(|s| s.kind)
    }

    /// Returns the text value of a node.
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].value.as_deref()
    }

    /// Sets or clears the text value of a node.
    pub fn set_value(&mut self, id: NodeId, value: Option<String>) {
        self.nodes[id.0].value = value;
    }

    /// Returns an attribute value.
    pub fn attribute(&self, id: NodeId, name: &QName) -> Option<&str> {
        self.nodes[id.0].attributes.get(name).map(String::as_str)
    }

    /// Sets an attribute.
    pub fn set_attribute(&mut self, id: NodeId, name: QName, value: impl Into<String>) {
        self.nodes[id.0].attributes.insert(name, value.into());
    }

    /// Removes an attribute, returning its value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &QName) -> Option<String> {
        self.nodes[id.0].attributes.shift_remove(name)
    }

    /// Iterates the attributes of a node in insertion order.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&QName, &str)> {
        self.nodes[id.0]
            .attributes
            .iter()
            .map(|(k, v)| (k, v.as_str()))
    }

    /// Returns the children of a node in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Returns the parent of a node; `None` for the root and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    // ============================================
    // Mutation
    // ============================================

    /// Appends a child with an explicit name and optional schema binding.
    pub fn append_child(
        &mut self,
        parent: NodeId,
        qname: QName,
        schema: Option<SchemaId>,
        value: Option<String>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = NodeData::new(qname, schema, Some(parent));
        node.value = value;
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Appends a child named and bound after `schema`.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        schema: SchemaId,
        value: Option<String>,
    ) -> NodeId {
        let qname = self.schema.node(schema).qname.clone();
        self.append_child(parent, qname, Some(schema), value)
    }

    /// Deep-copies `source`'s subtree from `other` and appends it under
    /// `parent`. Both trees must be bound to the same schema.
    pub fn import_child(&mut self, parent: NodeId, other: &ConfigTree, source: NodeId) -> NodeId {
        let data = &other.nodes[source.0];
        let id = self.append_child(parent, data.qname.clone(), data.schema, data.value.clone());
        self.nodes[id.0].attributes = data.attributes.clone();
        for child in other.children(source) {
            self.import_child(id, other, *child);
        }
        id
    }

    /// Copies the attributes of `source` in `other` onto `target`.
    pub fn copy_attributes(&mut self, target: NodeId, other: &ConfigTree, source: NodeId) {
        for (name, value) in other.attributes(source) {
            self.set_attribute(target, name.clone(), value);
        }
    }

    /// Detaches a node (and its subtree) from its parent.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != id);
        }
    }

    // ============================================
    // Paths
    // ============================================

    /// Builds the instance path of a node.
    ///
    /// List entries are identified by their key leaves, leaf-list entries
    /// by their value.
    pub fn path(&self, id: NodeId) -> DataPath {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                break;
            }
            segments.push(self.segment(node));
            current = self.parent(node);
        }
        segments.reverse();
        DataPath::from_segments(segments)
    }

    fn segment(&self, id: NodeId) -> PathSegment {
        let mut segment = PathSegment::new(self.qname(id).clone());
        match self.schema_node(id) {
            Some(schema) if schema.kind == SchemaKind::List => {
                for key in &schema.key_leaves {
                    if let Some(value) = self.find_child(id, key).and_then(|k| self.value(k)) {
                        segment.keys.push((key.clone(), value.to_string()));
                    }
                }
            },
            Some(schema) if schema.kind == SchemaKind::LeafList => {
                segment.value = self.value(id).map(str::to_string);
            },
            _ => {},
        }
        segment
    }
}
