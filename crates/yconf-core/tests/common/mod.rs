#![allow(dead_code)]
use std::sync::Arc;

use yconf_core::{ConfigTree, NodeId, Schema};

/// Fleet inventory: a keyed list, a leaf-list, a nested choice and an rpc.
pub const FLEET_SCHEMA: &str = r#"
namespace: urn:example:fleet
nodes:
  - kind: container
    name: fleet
    children:
      - { kind: leaf, name: owner, type: string, mandatory: true }
      - kind: list
        name: vehicle
        key: [plate, region]
        children:
          - { kind: leaf, name: plate, type: string }
          - { kind: leaf, name: region, type: string }
          - { kind: leaf, name: seats, type: uint8, default: 5 }
          - { kind: leaf, name: electric, type: boolean }
          - { kind: leaf, name: tinted, type: empty }
      - { kind: leaf-list, name: depot, type: string }
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
              - kind: choice
                name: charging
                cases:
                  - { kind: leaf, name: fast-kw, type: uint16 }
                  - { kind: leaf, name: slow-kw, type: uint16 }
  - kind: rpc
    name: recall
    input:
      - { kind: leaf, name: plate, type: string, mandatory: true }
"#;

/// Loads a schema description, panicking on error (intended for tests).
pub fn fleet_schema() -> Arc<Schema> {
    Arc::new(Schema::from_yaml(FLEET_SCHEMA).expect("Failed to load fleet schema"))
}

/// Parses a JSON document against `schema`.
pub fn tree_from_json(schema: &Arc<Schema>, json: &str) -> ConfigTree {
    ConfigTree::from_json(schema.clone(), json).expect("Failed to create test tree from JSON")
}

/// Returns a populated fleet fixture.
pub fn fleet_tree() -> ConfigTree {
    tree_from_json(
        &fleet_schema(),
        r#"{
            "@": {"serial": "12"},
            "fleet": {
                "owner": "ACME",
                "vehicle": [
                    {"plate": "AB-1", "region": "north", "seats": 7, "tinted": [null]},
                    {"plate": "CD-2", "region": "south", "electric": false}
                ],
                "depot": ["harbor", "airport"],
                "@depot": {"operation": "merge"},
                "octane": 98
            }
        }"#,
    )
}

/// Walks down the first children matching each local name.
pub fn find(tree: &ConfigTree, names: &[&str]) -> Option<NodeId> {
    let mut node = tree.root();
    for name in names {
        node = tree
            .children(node)
            .iter()
            .copied()
            .find(|child| tree.qname(*child).name() == *name)?;
    }
    Some(node)
}
