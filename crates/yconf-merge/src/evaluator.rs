//! Leafref target evaluation.
//!
//! Full XPath is out of scope for the engine. Callers plug their own
//! evaluator in through [`ReferenceEvaluator`]; [`PathEvaluator`] covers
//! the plain location paths that most leafrefs use.

use yconf_core::{ConfigTree, NodeId};

/// Decides whether a leafref's value has a target in the tree.
///
/// Implemented for any `Fn(&ConfigTree, NodeId, &str) -> bool`, so a
/// closure can stand in for a real evaluator.
pub trait ReferenceEvaluator {
    /// Returns true if the value of `node` matches a node selected by
    /// `path`, evaluated with `node` as context.
    fn evaluate_reference(&self, tree: &ConfigTree, node: NodeId, path: &str) -> bool;
}

impl<F> ReferenceEvaluator for F
where
    F: Fn(&ConfigTree, NodeId, &str) -> bool,
{
    fn evaluate_reference(&self, tree: &ConfigTree, node: NodeId, path: &str) -> bool {
        self(tree, node, path)
    }
}

/// Evaluates absolute (`/a/b`) and relative (`../b`) location paths.
///
/// Steps match on local name, so module prefixes are accepted and ignored.
/// Predicates are stripped rather than evaluated, which makes the check
/// permissive for paths such as `/ifs/if[name = current()/../x]/mtu`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathEvaluator;

impl ReferenceEvaluator for PathEvaluator {
    fn evaluate_reference(&self, tree: &ConfigTree, node: NodeId, path: &str) -> bool {
        let Some(value) = tree.value(node) else {
            return false;
        };
        select(tree, node, &strip_predicates(path))
            .into_iter()
            .any(|target| tree.value(target) == Some(value))
    }
}

fn select(tree: &ConfigTree, context: NodeId, path: &str) -> Vec<NodeId> {
    let (mut current, rest) = match path.trim().strip_prefix('/') {
        Some(rest) => (vec![tree.root()], rest),
        None => (vec![context], path.trim()),
    };

    for step in rest.split('/').map(str::trim).filter(|s| !s.is_empty()) {
        current = match step {
            "." => current,
            ".." => {
                let mut parents = Vec::new();
                for parent in current.iter().filter_map(|n| tree.parent(*n)) {
                    if !parents.contains(&parent) {
                        parents.push(parent);
                    }
                }
                parents
            },
            name => {
                let local = name.rsplit(':').next().unwrap_or(name);
                current
                    .iter()
                    .flat_map(|n| tree.children(*n).iter().copied())
                    .filter(|child| tree.qname(*child).name() == local)
                    .collect()
            },
        };
        if current.is_empty() {
            break;
        }
    }
    current
}

fn strip_predicates(path: &str) -> String {
    let mut depth = 0usize;
    path.chars()
        .filter(|c| match c {
            '[' => {
                depth += 1;
                false
            },
            ']' => {
                depth = depth.saturating_sub(1);
                false
            },
            _ => depth == 0,
        })
        .collect()
}
