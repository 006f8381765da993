#![allow(dead_code)]
use std::sync::Arc;

use yconf_core::{ConfigTree, DataPath, EditOp, NodeId, Schema};
use yconf_merge::{MergeResult, Merger};

/// Car inventory: a plain container with a keyed list, a leaf-list and a
/// presence container. No defaults, so merges echo their deltas.
pub const CAR_SCHEMA: &str = r#"
namespace: urn:example:car
nodes:
  - kind: container
    name: car
    children:
      - { kind: leaf, name: brand, type: string }
      - kind: list
        name: models
        key: [name]
        children:
          - { kind: leaf, name: name, type: string }
          - { kind: leaf, name: capacity, type: uint8 }
      - { kind: leaf-list, name: colors, type: string }
      - kind: container
        name: warranty
        presence: true
        children:
          - { kind: leaf, name: years, type: uint8 }
"#;

/// Network settings with defaults and a choice whose default case is tcp.
pub const NETWORK_SCHEMA: &str = r#"
namespace: urn:example:net
nodes:
  - kind: container
    name: server
    children:
      - { kind: leaf, name: host, type: string, mandatory: true }
      - { kind: leaf, name: timeout, type: uint32, default: 30 }
      - kind: choice
        name: transport
        default: tcp
        cases:
          - kind: case
            name: tcp
            children:
              - { kind: leaf, name: port, type: uint16, default: 80 }
              - { kind: leaf, name: nodelay, type: boolean }
          - kind: case
            name: udp
            children:
              - { kind: leaf, name: size, type: uint16, default: 512 }
              - { kind: leaf, name: ttl, type: uint8 }
      - kind: container
        name: tls
        presence: true
        children:
          - { kind: leaf, name: version, type: string, default: "1.3" }
      - kind: container
        name: logging
        children:
          - { kind: leaf, name: level, type: enumeration, enums: [debug, info, warn], default: info }
          - { kind: leaf, name: file, type: string }
  - kind: container
    name: quota
    children:
      - kind: choice
        name: limit
        cases:
          - kind: case
            name: soft
            children:
              - { kind: leaf, name: warn-at, type: uint32, default: 80 }
"#;

/// Vehicle power source: the battery case holds a choice of its own, so
/// the charging defaults only apply while the battery case is selected.
pub const VEHICLE_SCHEMA: &str = r#"
namespace: urn:example:ev
nodes:
  - kind: container
    name: vehicle
    children:
      - { kind: leaf, name: name, type: string }
      - kind: choice
        name: power
        default: fuel
        cases:
          - kind: case
            name: fuel
            children:
              - { kind: leaf, name: octane, type: uint8, default: 95 }
          - kind: case
            name: battery
            children:
              - { kind: leaf, name: capacity-kwh, type: uint16 }
              - kind: choice
                name: charging
                default: slow
                cases:
                  - kind: case
                    name: fast
                    children:
                      - { kind: leaf, name: fast-kw, type: uint16, default: 150 }
                  - kind: case
                    name: slow
                    children:
                      - { kind: leaf, name: slow-kw, type: uint16, default: 7 }
"#;

/// Interfaces referenced by a leafref.
pub const ROUTING_SCHEMA: &str = r#"
namespace: urn:example:routing
nodes:
  - kind: container
    name: interfaces
    children:
      - kind: list
        name: interface
        key: [name]
        children:
          - { kind: leaf, name: name, type: string }
          - { kind: leaf, name: enabled, type: empty }
  - kind: container
    name: routing
    children:
      - { kind: leaf, name: uplink, type: leafref, path: /interfaces/interface/name }
"#;

pub fn schema(yaml: &str) -> Arc<Schema> {
    Arc::new(Schema::from_yaml(yaml).expect("Failed to build test schema"))
}

pub fn car_schema() -> Arc<Schema> {
    schema(CAR_SCHEMA)
}

pub fn network_schema() -> Arc<Schema> {
    schema(NETWORK_SCHEMA)
}

pub fn vehicle_schema() -> Arc<Schema> {
    schema(VEHICLE_SCHEMA)
}

pub fn routing_schema() -> Arc<Schema> {
    schema(ROUTING_SCHEMA)
}

/// Helper to create a tree from JSON. Panics on invalid input.
pub fn tree(schema: &Arc<Schema>, json: &str) -> ConfigTree {
    ConfigTree::from_json(schema.clone(), json).expect("Failed to create test tree from JSON")
}

pub fn merge(base: &ConfigTree, delta: &ConfigTree) -> MergeResult {
    merge_with(base, delta, EditOp::Merge)
}

pub fn merge_with(base: &ConfigTree, delta: &ConfigTree, op: EditOp) -> MergeResult {
    Merger::new(base.schema().clone())
        .copy_and_merge(base, delta, op)
        .expect("merge failed")
}

/// The deletion paths of a result, rendered.
pub fn deletions(result: &MergeResult) -> Vec<String> {
    result.deletions().iter().map(DataPath::to_string).collect()
}

/// Follows a chain of local names from the root, taking the first match
/// at each level.
pub fn find(tree: &ConfigTree, names: &[&str]) -> Option<NodeId> {
    let mut current = tree.root();
    for name in names {
        current = tree
            .children(current)
            .iter()
            .copied()
            .find(|c| tree.qname(*c).name() == *name)?;
    }
    Some(current)
}

pub fn value_at<'a>(tree: &'a ConfigTree, names: &[&str]) -> Option<&'a str> {
    find(tree, names).and_then(|id| tree.value(id))
}
