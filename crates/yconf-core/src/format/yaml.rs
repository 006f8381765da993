use serde_json::Value;
use std::sync::Arc;

use crate::error::{Result, YconfError};
use crate::format::{FormatParser, FormatSerializer};
use crate::schema::Schema;
use crate::tree::ConfigTree;

pub struct YamlFormat;

impl FormatParser for YamlFormat {
    fn parse(&self, schema: &Arc<Schema>, input: &str) -> Result<ConfigTree> {
        ConfigTree::from_yaml(schema.clone(), input)
    }
}

impl FormatSerializer for YamlFormat {
    fn serialize(&self, tree: &ConfigTree) -> Result<String> {
        tree.to_yaml()
    }
}

impl ConfigTree {
    /// Parses a YAML document shaped like the JSON encoding.
    pub fn from_yaml(schema: Arc<Schema>, yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| YconfError::parse_error_with_cause("yaml_source", e.to_string(), e))?;
        Self::from_value(schema, &value)
    }

    /// Serializes the tree to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.to_value())
            .map_err(|e| YconfError::parse_error("yaml_target", e.to_string()))
    }
}
