use serde_json::json;
use yconf_core::{ConfigTree, EditOp, NodeId, YconfError};
use yconf_merge::{copy_and_merge, validate, validate_with};

mod common;

#[test]
fn test_merged_network_config_needs_host() {
    let schema = common::network_schema();
    let base = ConfigTree::new(schema.clone());

    let defaults_only = common::merge(&base, &ConfigTree::new(schema.clone()));
    let failure = validate(defaults_only.tree()).unwrap_err();
    assert!(failure.reason.contains("host"));
    assert_eq!(failure.path.unwrap().to_string(), "/server");

    let delta = common::tree(&schema, r#"{"server": {"host": "db1"}}"#);
    let complete = common::merge(&base, &delta);
    assert!(validate(complete.tree()).is_ok());
}

#[test]
fn test_leafref_must_resolve() {
    let schema = common::routing_schema();
    let base = common::tree(&schema, r#"{"interfaces": {"interface": [{"name": "eth0"}]}}"#);

    let good = common::tree(&schema, r#"{"routing": {"uplink": "eth0"}}"#);
    let merged = common::merge(&base, &good);
    assert!(validate(merged.tree()).is_ok());

    let dangling = common::tree(&schema, r#"{"routing": {"uplink": "eth9"}}"#);
    let merged = common::merge(&base, &dangling);
    let failure = validate(merged.tree()).unwrap_err();
    assert!(failure.reason.contains("/interfaces/interface/name"));
    assert!(failure.reason.contains("eth9"));
    assert_eq!(failure.path.unwrap().to_string(), "/routing/uplink");
}

#[test]
fn test_custom_evaluator() {
    let schema = common::routing_schema();
    let tree = common::tree(&schema, r#"{"routing": {"uplink": "anything"}}"#);

    let permissive = |_: &ConfigTree, _: NodeId, _: &str| true;
    assert!(validate_with(&tree, &permissive).is_ok());
    assert!(validate(&tree).is_err());
}

#[test]
fn test_validation_failure_converts_to_error() {
    let schema = common::routing_schema();
    let tree = common::tree(&schema, r#"{"routing": {"uplink": "eth1"}}"#);

    let error: YconfError = validate(&tree).unwrap_err().into();
    assert!(error.is_validation_error());
    assert_eq!(error.error_tag(), "operation-failed");
}

#[test]
fn test_empty_leaf_round_trip() {
    let schema = common::routing_schema();
    let base = ConfigTree::new(schema.clone());
    let delta = common::tree(
        &schema,
        r#"{"interfaces": {"interface": [{"name": "eth0", "enabled": [null]}]}}"#,
    );

    let result = common::merge(&base, &delta);
    assert_eq!(
        result.tree().to_value(),
        json!({"interfaces": {"interface": [{"name": "eth0", "enabled": [null]}]}})
    );
    assert!(common::merge(result.tree(), &delta).is_noop());
}

#[test]
fn test_empty_leaf_rejects_value() {
    let schema = common::routing_schema();
    let base = ConfigTree::new(schema.clone());
    let delta = common::tree(
        &schema,
        r#"{"interfaces": {"interface": [{"name": "eth0", "enabled": "yes"}]}}"#,
    );

    let err = copy_and_merge(&base, &delta, EditOp::Merge).unwrap_err();
    assert_eq!(err.error_tag(), "invalid-value");
    assert!(err.path().unwrap().to_string().ends_with("enabled"));
}
