//! Text encodings of configuration trees.
//!
//! Trees are encoded the way RFC 7951 encodes YANG data in JSON: containers
//! and list entries are objects, lists and leaf-lists are arrays, and
//! attributes travel as `@` metadata. YAML uses the same shape.

use std::sync::Arc;

use crate::error::Result;
use crate::schema::Schema;
use crate::tree::ConfigTree;

pub mod json;
pub mod yaml;

pub use json::JsonFormat;
pub use yaml::YamlFormat;

/// Supported tree encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Returns the file extensions associated with this format.
    pub fn extensions(&self) -> &[&str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }

    /// Guesses the format from a file extension (without dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            _ => None,
        }
    }

    /// Parses `input` into a tree bound to `schema`.
    pub fn parse(&self, schema: &Arc<Schema>, input: &str) -> Result<ConfigTree> {
        match self {
            ConfigFormat::Json => JsonFormat.parse(schema, input),
            ConfigFormat::Yaml => YamlFormat.parse(schema, input),
        }
    }

    /// Serializes `tree` in this format.
    pub fn serialize(&self, tree: &ConfigTree) -> Result<String> {
        match self {
            ConfigFormat::Json => JsonFormat.serialize(tree),
            ConfigFormat::Yaml => YamlFormat.serialize(tree),
        }
    }
}

/// A trait for parsing a configuration tree from a string.
pub trait FormatParser: Send + Sync {
    /// Parses the input string into a tree bound to `schema`.
    fn parse(&self, schema: &Arc<Schema>, input: &str) -> Result<ConfigTree>;
}

/// A trait for serializing a configuration tree to a string.
pub trait FormatSerializer: Send + Sync {
    /// Serializes the tree into a string.
    fn serialize(&self, tree: &ConfigTree) -> Result<String>;
}
