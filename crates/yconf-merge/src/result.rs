//! Outcome of a merge.

use serde_json::{Value, json};
use yconf_core::{ConfigTree, DataPath};

/// The result of merging a delta into a base configuration.
///
/// `changes` mirrors the new tree but holds only what was created or
/// modified, including inserted defaults. It is `None` when nothing
/// changed. Removed nodes are listed in `deletions` instead.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The merged configuration.
    tree: ConfigTree,

    /// Created or modified nodes, if any.
    changes: Option<ConfigTree>,

    /// Paths of removed nodes, in removal order.
    deletions: Vec<DataPath>,
}

impl MergeResult {
    /// Creates a merge result.
    pub fn new(tree: ConfigTree, changes: Option<ConfigTree>, deletions: Vec<DataPath>) -> Self {
        Self {
            tree,
            changes,
            deletions,
        }
    }

    /// Returns the merged configuration.
    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    /// Returns the changes tree, when anything changed.
    pub fn changes(&self) -> Option<&ConfigTree> {
        self.changes.as_ref()
    }

    /// Returns the removed paths.
    pub fn deletions(&self) -> &[DataPath] {
        &self.deletions
    }

    /// Returns true if the merge neither changed nor removed anything.
    pub fn is_noop(&self) -> bool {
        self.changes.is_none() && self.deletions.is_empty()
    }

    /// Consumes the result, returning the merged configuration.
    pub fn into_tree(self) -> ConfigTree {
        self.tree
    }

    /// Consumes the result, returning all of its parts.
    pub fn into_parts(self) -> (ConfigTree, Option<ConfigTree>, Vec<DataPath>) {
        (self.tree, self.changes, self.deletions)
    }

    /// Renders the result as a JSON report with `config`, `changes` and
    /// `deletions` members.
    pub fn to_report(&self) -> Value {
        json!({
            "config": self.tree.to_value(),
            "changes": self.changes.as_ref().map(ConfigTree::to_value),
            "deletions": self
                .deletions
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
        })
    }
}
