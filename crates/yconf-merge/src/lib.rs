//! # yconf Merge
//!
//! NETCONF `edit-config` semantics over YANG-modeled configuration trees.
//!
//! This crate merges a delta tree into a copy of a base tree, honoring the
//! per-node `operation` attribute, list identity by key and leaf-list
//! identity by value. It inserts schema defaults (respecting choice and
//! case activation), reports what changed and what was removed, and
//! validates the result.
//!
//! ## Features
//!
//! - `merge`, `replace`, `create`, `delete` and `remove` operations, with
//!   `none` as a request-wide default
//! - Changes tree and deletion list describing the exact effect of a merge
//! - Default insertion for leaves, containers and choice default cases
//! - Validation of mandatory leaves, leafrefs and node shapes
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use yconf_core::{ConfigTree, EditOp, Schema};
//! use yconf_merge::{Merger, validate};
//!
//! let schema = Arc::new(Schema::from_yaml(r#"
//! namespace: urn:example:car
//! nodes:
//!   - kind: container
//!     name: car
//!     children:
//!       - kind: leaf
//!         name: brand
//!         type: string
//!       - kind: leaf
//!         name: doors
//!         type: uint8
//!         default: 4
//! "#).unwrap());
//!
//! let base = ConfigTree::new(schema.clone());
//! let delta = ConfigTree::from_json(schema.clone(), r#"{"car": {"brand": "Toyota"}}"#).unwrap();
//!
//! let result = Merger::new(schema).copy_and_merge(&base, &delta, EditOp::Merge).unwrap();
//! assert_eq!(
//!     result.tree().to_value(),
//!     serde_json::json!({"car": {"brand": "Toyota", "doors": 4}})
//! );
//! validate(result.tree()).unwrap();
//! ```

pub mod defaults;
pub mod engine;
pub mod evaluator;
pub mod operation;
pub mod options;
pub mod presence;
pub mod result;
pub mod validate;

// Re-exports
pub use defaults::fill_defaults;
pub use engine::{Merger, copy_and_merge};
pub use evaluator::{PathEvaluator, ReferenceEvaluator};
pub use operation::resolve_operation;
pub use options::{MergeOptions, MergeOptionsBuilder};
pub use presence::{DataPresence, check_data_presence};
pub use result::MergeResult;
pub use validate::{validate, validate_with};

// Re-export yconf_core for consumers
pub use yconf_core;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
