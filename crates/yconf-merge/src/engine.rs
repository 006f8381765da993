//! The edit-config merge engine.
//!
//! A merge never mutates its inputs. The base tree is copied into a fresh
//! tree, the delta is walked level by level against it, and on the first
//! error the partially edited copy is dropped.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};
use yconf_core::{ConfigTree, DataPath, EditOp, NodeId, Result, Schema, SchemaId, SchemaKind, YconfError};

use crate::defaults::{self, conflicting_siblings, default_allowed_without};
use crate::operation::resolve_operation;
use crate::options::MergeOptions;
use crate::presence::{DataPresence, check_data_presence, list_keys};
use crate::result::MergeResult;

/// Applies NETCONF edit-config deltas to configuration trees.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use std::sync::Arc;
/// use yconf_core::{ConfigTree, EditOp, LeafType, SchemaBuilder};
/// use yconf_merge::Merger;
///
/// let mut b = SchemaBuilder::new("urn:example:car");
/// let car = b.container(b.root(), "car");
/// b.leaf(car, "brand", LeafType::String);
/// let schema = Arc::new(b.build().unwrap());
///
/// let base = ConfigTree::new(schema.clone());
/// let delta = ConfigTree::from_json(schema.clone(), r#"{"car": {"brand": "Toyota"}}"#).unwrap();
///
/// let result = Merger::new(schema).copy_and_merge(&base, &delta, EditOp::Merge).unwrap();
/// assert!(result.changes().is_some());
/// assert!(result.deletions().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Merger {
    schema: Arc<Schema>,
    options: MergeOptions,
}

impl Merger {
    /// Creates a merger with default options.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_options(schema, MergeOptions::default())
    }

    /// Creates a merger with the given options.
    pub fn with_options(schema: Arc<Schema>, options: MergeOptions) -> Self {
        Self { schema, options }
    }

    /// Returns the schema trees must be bound to.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the options.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merges `delta` into a copy of `base` using the configured default
    /// operation.
    pub fn merge(&self, base: &ConfigTree, delta: &ConfigTree) -> Result<MergeResult> {
        self.copy_and_merge(base, delta, self.options.default_operation())
    }

    /// Merges `delta` into a copy of `base`.
    ///
    /// Delta nodes without an `operation` attribute use `default_op`,
    /// which may be [`EditOp::None`]. The first error aborts the merge and
    /// nothing is returned but the error.
    #[instrument(skip_all, fields(default_op = %default_op))]
    pub fn copy_and_merge(
        &self,
        base: &ConfigTree,
        delta: &ConfigTree,
        default_op: EditOp,
    ) -> Result<MergeResult> {
        if !Arc::ptr_eq(base.schema(), &self.schema) {
            return Err(YconfError::internal("base tree is bound to a different schema"));
        }

        let mut tree = ConfigTree::new(Arc::clone(&self.schema));
        let root = tree.root();
        let serial = self.options.serial_qname();
        if let Some(value) = base.attribute(base.root(), &serial) {
            tree.set_attribute(root, serial, value);
        }
        copy_bound(&mut tree, root, base, base.root());

        let changes = ConfigTree::new(Arc::clone(&self.schema));
        let mut run = EditRun {
            schema: &self.schema,
            delta,
            tree,
            changes,
            deletions: Vec::new(),
            touched: HashSet::new(),
            fill_defaults: self.options.fill_defaults(),
        };

        let changes_root = run.changes.root();
        let changed = run.edit(root, delta.root(), changes_root, default_op)?;

        debug!(
            changed,
            deletions = run.deletions.len(),
            "merge complete"
        );

        let changes = (changed && !run.changes.is_empty()).then_some(run.changes);
        Ok(MergeResult::new(run.tree, changes, run.deletions))
    }
}

/// Merges `delta` into a copy of `base` with default options, using the
/// base tree's schema.
pub fn copy_and_merge(base: &ConfigTree, delta: &ConfigTree, default_op: EditOp) -> Result<MergeResult> {
    Merger::new(Arc::clone(base.schema())).copy_and_merge(base, delta, default_op)
}

/// Copies the schema-bound children of `source` under `parent`.
fn copy_bound(tree: &mut ConfigTree, parent: NodeId, base: &ConfigTree, source: NodeId) {
    for child in base.children(source) {
        let Some(schema_id) = base.schema_id(*child) else {
            warn!(node = %base.path(*child), "dropping base node unknown to the schema");
            continue;
        };
        let copy = tree.create_child(parent, schema_id, base.value(*child).map(str::to_string));
        tree.copy_attributes(copy, base, *child);
        copy_bound(tree, copy, base, *child);
    }
}

/// State of a single merge.
struct EditRun<'a> {
    schema: &'a Schema,
    delta: &'a ConfigTree,
    tree: ConfigTree,
    changes: ConfigTree,
    deletions: Vec<DataPath>,
    /// Tree nodes the delta has named so far in this run.
    touched: HashSet<NodeId>,
    fill_defaults: bool,
}

impl EditRun<'_> {
    /// Applies the children of `delta_node` to `node`.
    ///
    /// Returns true if anything under `node` was created or modified.
    fn edit(&mut self, node: NodeId, delta_node: NodeId, changes_node: NodeId, op: EditOp) -> Result<bool> {
        let delta = self.delta;
        let schema_id = self
            .tree
            .schema_id(node)
            .ok_or_else(|| YconfError::internal(format!("'{}' has no schema", self.tree.path(node))))?;

        let mut changed = false;
        for &delta_child in delta.children(delta_node) {
            let qname = delta.qname(delta_child);
            let child_schema = self.schema.find_child(schema_id, qname).ok_or_else(|| {
                YconfError::invalid_value(
                    delta.path(delta_child),
                    format!("unknown element '{}'", qname.clark()),
                )
            })?;
            let child_op = resolve_operation(op, delta, delta_child)?;
            trace!(node = %delta.path(delta_child), op = %child_op, "editing");

            changed |= match self.tree.find_child(node, qname) {
                None => self.edit_new(child_schema, node, delta_child, changes_node, child_op)?,
                Some(existing) => {
                    self.edit_existing(child_schema, node, existing, delta_child, changes_node, child_op)?
                },
            };
        }

        if op == EditOp::Replace {
            self.delete_missing(node, delta_node)?;
        }

        if self.fill_defaults {
            changed |= defaults::fill_defaults(&mut self.tree, node, &mut self.changes, changes_node);
        }

        let schema_node = self.schema.node(schema_id);
        if node != self.tree.root()
            && schema_node.kind == SchemaKind::Container
            && !schema_node.is_presence
            && self.tree.children(node).is_empty()
        {
            self.tree.remove(node);
        }

        Ok(changed)
    }

    /// Handles a delta node with no same-named sibling in the tree.
    fn edit_new(
        &mut self,
        child_schema: SchemaId,
        parent: NodeId,
        delta_child: NodeId,
        changes_node: NodeId,
        op: EditOp,
    ) -> Result<bool> {
        match op {
            EditOp::Delete | EditOp::None => {
                return Err(YconfError::data_missing(self.delta.path(delta_child)));
            },
            EditOp::Remove => return Ok(false),
            EditOp::Merge | EditOp::Replace | EditOp::Create => {},
        }

        self.remove_conflicting_cases(parent, child_schema, delta_child)?;

        let schema_node = self.schema.node(child_schema);
        match schema_node.kind {
            SchemaKind::Container | SchemaKind::List | SchemaKind::Rpc => {
                self.check_interior(delta_child)?;
                if schema_node.kind == SchemaKind::List {
                    list_keys(self.schema, child_schema, self.delta, delta_child)?;
                }
                let forced = schema_node.is_presence || schema_node.kind != SchemaKind::Container;

                let child = self.tree.create_child(parent, child_schema, None);
                self.touched.insert(child);
                let changes_child = self.changes.create_child(changes_node, child_schema, None);
                let sub = self.edit(child, delta_child, changes_child, op)?;
                if !sub && !forced {
                    self.changes.remove(changes_child);
                }
                Ok(sub || forced)
            },
            SchemaKind::Leaf | SchemaKind::LeafList => {
                let value = self.leaf_value(child_schema, delta_child)?;
                let child = self.tree.create_child(parent, child_schema, Some(value.clone()));
                self.touched.insert(child);
                self.changes.create_child(changes_node, child_schema, Some(value));
                Ok(true)
            },
            other => Err(YconfError::unsupported(other.as_str(), self.delta.path(delta_child))),
        }
    }

    /// Handles a delta node whose name already exists under `parent`.
    fn edit_existing(
        &mut self,
        child_schema: SchemaId,
        parent: NodeId,
        existing: NodeId,
        delta_child: NodeId,
        changes_node: NodeId,
        op: EditOp,
    ) -> Result<bool> {
        let delta = self.delta;
        match op {
            EditOp::Delete | EditOp::Remove => {
                self.delete(child_schema, parent, delta_child, op)?;
                return Ok(false);
            },
            EditOp::Create => {
                if check_data_presence(self.schema, child_schema, delta, delta_child, &self.tree, parent)?.exists() {
                    return Err(YconfError::data_exists(delta.path(delta_child)));
                }
            },
            EditOp::Merge | EditOp::Replace | EditOp::None => {},
        }
        self.touched.insert(existing);

        let schema_node = self.schema.node(child_schema);
        match schema_node.kind {
            SchemaKind::Container => {
                self.check_interior(delta_child)?;
                self.edit_tracked(existing, delta_child, changes_node, child_schema, op)
            },
            SchemaKind::List => {
                self.check_interior(delta_child)?;
                match check_data_presence(self.schema, child_schema, delta, delta_child, &self.tree, parent)? {
                    DataPresence::Exists(entry) => self.edit_tracked(entry, delta_child, changes_node, child_schema, op),
                    DataPresence::ExistsUnkeyed => Ok(false),
                    DataPresence::Missing => self.edit_new(child_schema, parent, delta_child, changes_node, op),
                }
            },
            SchemaKind::Leaf => {
                let value = self.leaf_value(child_schema, delta_child)?;
                let current = self
                    .tree
                    .value(existing)
                    .map(|v| self.schema.canonical(child_schema, v));
                if current.as_deref() == Some(value.as_str()) || op == EditOp::None {
                    if self.schema.is_key_leaf(child_schema) {
                        self.changes.create_child(changes_node, child_schema, Some(value));
                    }
                    return Ok(false);
                }
                trace!(node = %self.tree.path(existing), value = %value, "updating leaf");
                self.tree.set_value(existing, Some(value.clone()));
                self.changes.create_child(changes_node, child_schema, Some(value));
                Ok(true)
            },
            SchemaKind::LeafList => {
                let value = self.leaf_value(child_schema, delta_child)?;
                let duplicate = self.tree.children_named(parent, &schema_node.qname).any(|entry| {
                    self.tree
                        .value(entry)
                        .is_some_and(|v| self.schema.canonical(child_schema, v) == value)
                });
                if duplicate {
                    return Ok(false);
                }
                if op == EditOp::None {
                    return Err(YconfError::data_missing(delta.path(delta_child)));
                }
                let entry = self.tree.create_child(parent, child_schema, Some(value.clone()));
                self.touched.insert(entry);
                self.changes.create_child(changes_node, child_schema, Some(value));
                Ok(true)
            },
            other => Err(YconfError::unsupported(other.as_str(), delta.path(delta_child))),
        }
    }

    /// Edits an existing interior node, keeping its changes entry only if
    /// something below it changed.
    fn edit_tracked(
        &mut self,
        node: NodeId,
        delta_child: NodeId,
        changes_node: NodeId,
        child_schema: SchemaId,
        op: EditOp,
    ) -> Result<bool> {
        let changes_child = self.changes.create_child(changes_node, child_schema, None);
        let sub = self.edit(node, delta_child, changes_child, op)?;
        if !sub {
            self.changes.remove(changes_child);
        }
        Ok(sub)
    }

    /// Removes the children of `node` that `delta_node` does not mention.
    fn delete_missing(&mut self, node: NodeId, delta_node: NodeId) -> Result<()> {
        let delta = self.delta;
        let mut unnamed = Vec::new();
        for child in self.tree.children(node).to_vec() {
            let Some(child_schema) = self.tree.schema_id(child) else {
                continue;
            };
            let qname = self.tree.qname(child);
            let named = delta.find_child(delta_node, qname).is_some()
                && check_data_presence(self.schema, child_schema, &self.tree, child, delta, delta_node)?.exists();
            if !named {
                unnamed.push((child, child_schema));
            }
        }

        let leaving: Vec<NodeId> = unnamed.iter().map(|(child, _)| *child).collect();
        for (child, child_schema) in unnamed {
            if self.holds_own_default(node, child, child_schema, &leaving) {
                continue;
            }
            self.remove_instance(child, child_schema, node, &leaving);
        }
        Ok(())
    }

    /// A leaf still at its default that the defaults pass would put straight
    /// back once `leaving` is gone; `replace` leaves it alone.
    fn holds_own_default(&self, parent: NodeId, node: NodeId, schema_id: SchemaId, leaving: &[NodeId]) -> bool {
        let Some(default) = &self.schema.node(schema_id).default_value else {
            return false;
        };
        self.fill_defaults
            && self
                .tree
                .value(node)
                .is_some_and(|v| self.schema.canonical(schema_id, v) == *default)
            && default_allowed_without(self.schema, &self.tree, parent, schema_id, leaving)
    }

    /// Applies a `delete` or `remove` targeting the instance named by
    /// `delta_child`.
    fn delete(&mut self, child_schema: SchemaId, parent: NodeId, delta_child: NodeId, op: EditOp) -> Result<()> {
        let delta = self.delta;
        match check_data_presence(self.schema, child_schema, delta, delta_child, &self.tree, parent)? {
            DataPresence::Missing if op == EditOp::Delete => Err(YconfError::data_missing(delta.path(delta_child))),
            DataPresence::Missing => Ok(()),
            DataPresence::Exists(target) => {
                self.remove_instance(target, child_schema, parent, &[target]);
                Ok(())
            },
            DataPresence::ExistsUnkeyed => {
                let qname = delta.qname(delta_child);
                let targets: Vec<NodeId> = self.tree.children_named(parent, qname).collect();
                for &target in &targets {
                    self.remove_instance(target, child_schema, parent, &targets);
                }
                Ok(())
            },
        }
    }

    /// Detaches `target`, one of the `leaving` children of `parent`, and
    /// reports it as deleted.
    ///
    /// Leaves whose default the defaults pass restores once every leaving
    /// sibling is gone are not reported.
    fn remove_instance(&mut self, target: NodeId, schema_id: SchemaId, parent: NodeId, leaving: &[NodeId]) {
        let path = self.tree.path(target);
        let restored = self.fill_defaults
            && self.schema.node(schema_id).default_value.is_some()
            && default_allowed_without(self.schema, &self.tree, parent, schema_id, leaving);

        self.tree.remove(target);
        debug!(node = %path, reported = !restored, "removed");
        if !restored {
            self.deletions.push(path);
        }
    }

    /// Removes siblings from cases that conflict with `child_schema`'s.
    ///
    /// A sibling the same delta already named means the delta itself names
    /// two cases of one choice, which is rejected.
    fn remove_conflicting_cases(&mut self, parent: NodeId, child_schema: SchemaId, delta_child: NodeId) -> Result<()> {
        let siblings = conflicting_siblings(self.schema, &self.tree, parent, child_schema);
        if let Some(earlier) = siblings.iter().find(|sibling| self.touched.contains(sibling)) {
            return Err(YconfError::invalid_value(
                self.delta.path(delta_child),
                format!(
                    "'{}' belongs to another case of the same choice as '{}'",
                    self.delta.qname(delta_child),
                    self.tree.qname(*earlier)
                ),
            ));
        }
        for sibling in siblings {
            let path = self.tree.path(sibling);
            debug!(node = %path, "removing node of conflicting case");
            self.tree.remove(sibling);
            self.deletions.push(path);
        }
        Ok(())
    }

    /// Validates a leaf or leaf-list delta node and returns its canonical
    /// value.
    fn leaf_value(&self, schema_id: SchemaId, delta_child: NodeId) -> Result<String> {
        let delta = self.delta;
        if !delta.children(delta_child).is_empty() {
            return Err(YconfError::invalid_value(
                delta.path(delta_child),
                "leaf cannot have child elements",
            ));
        }
        let raw = delta.value(delta_child).unwrap_or_default();
        self.schema
            .parse_value(schema_id, raw)
            .map_err(|e| YconfError::invalid_value(delta.path(delta_child), e))
    }

    fn check_interior(&self, delta_child: NodeId) -> Result<()> {
        match self.delta.value(delta_child) {
            Some(value) if !value.trim().is_empty() => Err(YconfError::invalid_value(
                self.delta.path(delta_child),
                format!("unexpected text '{}' in interior node", value),
            )),
            _ => Ok(()),
        }
    }
}
