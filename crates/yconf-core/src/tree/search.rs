use super::{ConfigTree, NodeId};
use crate::types::QName;

impl ConfigTree {
    /// Returns the first child named `qname`.
    pub fn find_child(&self, parent: NodeId, qname: &QName) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.qname(*child) == qname)
    }

    /// Iterates the children named `qname` in document order.
    pub fn children_named<'a>(
        &'a self,
        parent: NodeId,
        qname: &'a QName,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(parent)
            .iter()
            .copied()
            .filter(move |child| self.qname(*child) == qname)
    }

    /// Finds the list entry named `qname` whose key leaves carry exactly
    /// the given values.
    pub fn find_list_entry(
        &self,
        parent: NodeId,
        qname: &QName,
        keys: &[(QName, String)],
    ) -> Option<NodeId> {
        self.children_named(parent, qname).find(|entry| {
            keys.iter().all(|(key, expected)| {
                self.find_child(*entry, key)
                    .and_then(|leaf| self.value(leaf))
                    .is_some_and(|actual| actual == expected)
            })
        })
    }

    /// Finds the leaf-list entry named `qname` holding `value`.
    pub fn find_leaf_list_entry(&self, parent: NodeId, qname: &QName, value: &str) -> Option<NodeId> {
        self.children_named(parent, qname)
            .find(|entry| self.value(*entry) == Some(value))
    }

    /// Compares two trees structurally: names, values, attributes and
    /// child order. Detached arena slots are ignored.
    pub fn deep_eq(&self, other: &ConfigTree) -> bool {
        self.subtree_eq(self.root(), other, other.root())
    }

    /// Compares the subtree at `id` with the subtree at `other_id` in `other`.
    pub fn subtree_eq(&self, id: NodeId, other: &ConfigTree, other_id: NodeId) -> bool {
        if self.qname(id) != other.qname(other_id) || self.value(id) != other.value(other_id) {
            return false;
        }
        if !self.attributes(id).eq(other.attributes(other_id)) {
            return false;
        }
        let mine = self.children(id);
        let theirs = other.children(other_id);
        mine.len() == theirs.len()
            && mine
                .iter()
                .zip(theirs)
                .all(|(a, b)| self.subtree_eq(*a, other, *b))
    }
}

impl PartialEq for ConfigTree {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}
