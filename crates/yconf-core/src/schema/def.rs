//! Declarative module descriptions.
//!
//! A module description is a YAML or JSON document listing the data nodes
//! of one namespace. It is the format the CLI and the test fixtures use to
//! obtain a [`Schema`]; it describes an already-compiled schema tree and
//! is not a YANG parser.
//!
//! ```yaml
//! namespace: urn:example:car
//! nodes:
//!   - kind: container
//!     name: car
//!     children:
//!       - kind: leaf
//!         name: brand
//!         type: string
//!       - kind: list
//!         name: models
//!         key: [name]
//!         children:
//!           - { kind: leaf, name: name, type: string }
//!           - { kind: leaf, name: capacity, type: uint8, default: 4 }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{LeafType, Schema, SchemaBuilder, SchemaId};
use crate::error::{Result, YconfError};

/// A scalar written either as a string or as a bare YAML/JSON literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarDef {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ScalarDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Root of a module description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDef {
    /// Namespace of every node that does not override it.
    pub namespace: String,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

/// One statement of a module description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeDef {
    Container {
        name: String,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default)]
        presence: bool,
        #[serde(default)]
        children: Vec<NodeDef>,
    },
    List {
        name: String,
        #[serde(default)]
        namespace: Option<String>,
        key: Vec<String>,
        #[serde(default)]
        children: Vec<NodeDef>,
    },
    Leaf {
        name: String,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        enums: Vec<String>,
        #[serde(default)]
        default: Option<ScalarDef>,
        #[serde(default)]
        mandatory: bool,
    },
    LeafList {
        name: String,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        enums: Vec<String>,
    },
    Choice {
        name: String,
        #[serde(default)]
        namespace: Option<String>,
        /// Name of the default case.
        #[serde(default)]
        default: Option<String>,
        #[serde(default)]
        cases: Vec<NodeDef>,
    },
    Case {
        name: String,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default)]
        children: Vec<NodeDef>,
    },
    Rpc {
        name: String,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default)]
        input: Vec<NodeDef>,
        #[serde(default)]
        output: Vec<NodeDef>,
    },
    Notification {
        name: String,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default)]
        children: Vec<NodeDef>,
    },
    Anyxml {
        name: String,
        #[serde(default)]
        namespace: Option<String>,
    },
}

impl NodeDef {
    fn namespace(&self) -> Option<&str> {
        match self {
            Self::Container { namespace, .. }
            | Self::List { namespace, .. }
            | Self::Leaf { namespace, .. }
            | Self::LeafList { namespace, .. }
            | Self::Choice { namespace, .. }
            | Self::Case { namespace, .. }
            | Self::Rpc { namespace, .. }
            | Self::Notification { namespace, .. }
            | Self::Anyxml { namespace, .. } => namespace.as_deref(),
        }
    }
}

impl ModuleDef {
    /// Parses a YAML module description.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| YconfError::parse_error_with_cause("yaml_schema", e.to_string(), e))
    }

    /// Parses a JSON module description.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| YconfError::parse_error_with_cause("json_schema", e.to_string(), e))
    }

    /// Builds the schema described by this module.
    pub fn into_schema(self) -> Result<Schema> {
        let mut builder = SchemaBuilder::new(self.namespace.clone());
        let root = builder.root();
        for node in &self.nodes {
            add_node(&mut builder, root, node, &self.namespace)?;
        }
        builder.build()
    }
}

impl Schema {
    /// Loads a schema from a YAML module description.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        ModuleDef::from_yaml(yaml)?.into_schema()
    }

    /// Loads a schema from a JSON module description.
    pub fn from_json(json: &str) -> Result<Self> {
        ModuleDef::from_json(json)?.into_schema()
    }
}

fn add_node(
    builder: &mut SchemaBuilder,
    parent: SchemaId,
    def: &NodeDef,
    inherited_ns: &str,
) -> Result<SchemaId> {
    let namespace = def.namespace().unwrap_or(inherited_ns).to_string();
    builder.set_namespace(namespace.clone());

    let id = match def {
        NodeDef::Container {
            name,
            presence,
            children,
            ..
        } => {
            let id = if *presence {
                builder.presence_container(parent, name)
            } else {
                builder.container(parent, name)
            };
            add_children(builder, id, children, &namespace)?;
            id
        },
        NodeDef::List {
            name,
            key,
            children,
            ..
        } => {
            let keys: Vec<&str> = key.iter().map(String::as_str).collect();
            let id = builder.list(parent, name, &keys);
            add_children(builder, id, children, &namespace)?;
            id
        },
        NodeDef::Leaf {
            name,
            type_name,
            path,
            enums,
            default,
            mandatory,
            ..
        } => {
            let ty = leaf_type(name, type_name, path.as_deref(), enums)?;
            let id = builder.leaf(parent, name, ty);
            if let Some(default) = default {
                builder.set_default(id, default.to_string());
            }
            if *mandatory {
                builder.set_mandatory(id);
            }
            id
        },
        NodeDef::LeafList {
            name,
            type_name,
            path,
            enums,
            ..
        } => {
            let ty = leaf_type(name, type_name, path.as_deref(), enums)?;
            builder.leaf_list(parent, name, ty)
        },
        NodeDef::Choice {
            name,
            default,
            cases,
            ..
        } => {
            let id = builder.choice(parent, name);
            let mut default_case = None;
            for case in cases {
                let case_id = match case {
                    NodeDef::Case { .. } => add_node(builder, id, case, &namespace)?,
                    // Shorthand: the data node's implicit case is its parent.
                    other => {
                        let child = add_node(builder, id, other, &namespace)?;
                        parent_case(builder, child)?
                    },
                };
                if default.as_deref() == Some(case_name(case)) {
                    default_case = Some(case_id);
                }
            }
            match (default, default_case) {
                (Some(d), None) => {
                    return Err(YconfError::schema(format!(
                        "default case '{}' of choice '{}' does not exist",
                        d, name
                    )));
                },
                (_, Some(case)) => {
                    builder.set_default_case(id, case);
                },
                _ => {},
            }
            id
        },
        NodeDef::Case { name, children, .. } => {
            let id = builder.case(parent, name);
            add_children(builder, id, children, &namespace)?;
            id
        },
        NodeDef::Rpc {
            name,
            input,
            output,
            ..
        } => {
            let id = builder.rpc(parent, name);
            let input_id = builder.rpc_io(id, "input");
            add_children(builder, input_id, input, &namespace)?;
            let output_id = builder.rpc_io(id, "output");
            add_children(builder, output_id, output, &namespace)?;
            id
        },
        NodeDef::Notification { name, children, .. } => {
            let id = builder.notification(parent, name);
            add_children(builder, id, children, &namespace)?;
            id
        },
        NodeDef::Anyxml { name, .. } => builder.anyxml(parent, name),
    };
    builder.set_namespace(inherited_ns.to_string());
    Ok(id)
}

fn add_children(
    builder: &mut SchemaBuilder,
    parent: SchemaId,
    children: &[NodeDef],
    namespace: &str,
) -> Result<()> {
    for child in children {
        add_node(builder, parent, child, namespace)?;
        builder.set_namespace(namespace.to_string());
    }
    Ok(())
}

fn leaf_type(name: &str, type_name: &str, path: Option<&str>, enums: &[String]) -> Result<LeafType> {
    LeafType::from_name(type_name, path, enums).ok_or_else(|| {
        YconfError::schema(format!(
            "leaf '{}' has unsupported or incomplete type '{}'",
            name, type_name
        ))
    })
}

fn case_name(def: &NodeDef) -> &str {
    match def {
        NodeDef::Container { name, .. }
        | NodeDef::List { name, .. }
        | NodeDef::Leaf { name, .. }
        | NodeDef::LeafList { name, .. }
        | NodeDef::Choice { name, .. }
        | NodeDef::Case { name, .. }
        | NodeDef::Rpc { name, .. }
        | NodeDef::Notification { name, .. }
        | NodeDef::Anyxml { name, .. } => name,
    }
}

fn parent_case(builder: &SchemaBuilder, child: SchemaId) -> Result<SchemaId> {
    builder
        .case_of(child)
        .ok_or_else(|| YconfError::internal("shorthand case was not created"))
}
