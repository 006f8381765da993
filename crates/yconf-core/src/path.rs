//! Instance paths identifying nodes of a configuration tree.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::QName;

/// One step of a [`DataPath`].
///
/// List entries carry their key values, leaf-list entries their value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    pub name: QName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<(QName, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl PathSegment {
    /// Creates a plain segment.
    pub fn new(name: QName) -> Self {
        Self {
            name,
            keys: Vec::new(),
            value: None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.keys {
            write!(f, "[{}='{}']", key, value)?;
        }
        if let Some(value) = &self.value {
            write!(f, "[.='{}']", value)?;
        }
        Ok(())
    }
}

/// Opaque reference to a location in a configuration tree.
///
/// Used in deletion reports and error paths. Rendered like a YANG
/// instance-identifier.
///
/// # Example
///
/// ```
/// use yconf_core::{DataPath, PathSegment, QName};
///
/// let mut models = PathSegment::new(QName::new("urn:example:car", "models"));
/// models.keys.push((QName::new("urn:example:car", "name"), "Corolla".into()));
///
/// let path = DataPath::from_segments(vec![
///     PathSegment::new(QName::new("urn:example:car", "car")),
///     models,
/// ]);
/// assert_eq!(path.to_string(), "/car/models[name='Corolla']");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataPath(Vec<PathSegment>);

impl DataPath {
    /// The path of the tree root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Creates a path from its segments, outermost first.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Returns the segments, outermost first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the innermost segment.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Returns a new path extended by one segment.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
