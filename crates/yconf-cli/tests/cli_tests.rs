use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde_json::{Value, json};
use tempfile::TempDir;
use yconf_cli::{Cli, CliError, OutputFormat, Settings, run};

const SCHEMA: &str = r#"
namespace: urn:example:car
nodes:
  - kind: container
    name: car
    children:
      - { kind: leaf, name: brand, type: string, mandatory: true }
      - { kind: leaf, name: doors, type: uint8, default: 4 }
      - kind: list
        name: models
        key: [name]
        children:
          - { kind: leaf, name: name, type: string }
          - { kind: leaf, name: capacity, type: uint8 }
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("car.yaml"), SCHEMA).unwrap();
        Self { dir }
    }

    fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn run(&self, args: &[&str]) -> Result<String, CliError> {
        let mut argv = vec!["yconf".to_string()];
        argv.extend(args.iter().map(|arg| arg.to_string()));
        let cli = Cli::try_parse_from(argv).unwrap();
        run(&cli, &Settings::default())
    }
}

#[test]
fn test_merge_into_empty_base() {
    let ws = Workspace::new();
    ws.file(
        "delta.json",
        r#"{"car": {"brand": "Toyota", "models": [{"name": "Corolla", "capacity": 5}]}}"#,
    );

    let output = ws
        .run(&["merge", "-s", &ws.path("car.yaml"), "-d", &ws.path("delta.json"), "--validate"])
        .unwrap();
    let report: Value = serde_json::from_str(&output).unwrap();

    let expected = json!({
        "car": {
            "brand": "Toyota",
            "models": [{"name": "Corolla", "capacity": 5}],
            "doors": 4
        }
    });
    assert_eq!(report["config"], expected);
    assert_eq!(report["changes"], expected);
    assert_eq!(report["deletions"], json!([]));
}

#[test]
fn test_merge_reports_deletions_in_yaml() {
    let ws = Workspace::new();
    ws.file(
        "base.yaml",
        "car:\n  brand: Toyota\n  doors: 4\n  models:\n    - name: Corolla\n      capacity: 5\n",
    );
    ws.file(
        "delta.json",
        r#"{"car": {"models": [{"name": "Corolla", "@": {"operation": "delete"}}]}}"#,
    );

    let output = ws
        .run(&[
            "merge",
            "-s",
            &ws.path("car.yaml"),
            "-b",
            &ws.path("base.yaml"),
            "-d",
            &ws.path("delta.json"),
            "--format",
            "yaml",
        ])
        .unwrap();
    let report: Value = serde_yaml::from_str(&output).unwrap();

    assert_eq!(report["deletions"], json!(["/car/models[name='Corolla']"]));
    assert_eq!(report["changes"], Value::Null);
    assert_eq!(report["config"], json!({"car": {"brand": "Toyota", "doors": 4}}));
}

#[test]
fn test_default_operation_flag() {
    let ws = Workspace::new();
    ws.file("delta.json", r#"{"car": {"brand": "Toyota"}}"#);

    let err = ws
        .run(&[
            "merge",
            "-s",
            &ws.path("car.yaml"),
            "-d",
            &ws.path("delta.json"),
            "--default-operation",
            "none",
        ])
        .unwrap_err();

    assert_eq!(err.error_tag(), "data-missing");
    assert_eq!(err.path().unwrap().to_string(), "/car");
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_validate_command() {
    let ws = Workspace::new();
    ws.file("good.json", r#"{"car": {"brand": "Toyota"}}"#);
    ws.file("bad.json", r#"{"car": {"doors": 2}}"#);

    let output = ws
        .run(&["validate", "-s", &ws.path("car.yaml"), "--data", &ws.path("good.json")])
        .unwrap();
    assert_eq!(serde_json::from_str::<Value>(&output).unwrap(), json!({"valid": true}));

    let err = ws
        .run(&["validate", "-s", &ws.path("car.yaml"), "--data", &ws.path("bad.json")])
        .unwrap_err();
    assert!(err.to_string().contains("brand"));
    assert_eq!(err.exit_code(), 1);
    assert!(err.report().contains("path: /car"));
}

#[test]
fn test_missing_input_file() {
    let ws = Workspace::new();

    let err = ws
        .run(&["merge", "-s", &ws.path("car.yaml"), "-d", &ws.path("absent.json")])
        .unwrap_err();

    assert!(matches!(err, CliError::Read { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_output_format_default_is_json() {
    assert_eq!(Settings::default().output_format(), OutputFormat::Json);
}
