use indexmap::IndexMap;
use serde::Serialize;

/// One node of a parsed data document.
///
/// Sequence-ness is structural: a `Sequence` only ever appears as a mapping
/// value, standing for a tag repeated among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DataNode {
    /// Text content of an element without children or attributes.
    Scalar(String),
    /// Every occurrence of a repeated sibling tag, in document order.
    Sequence(Vec<DataNode>),
    /// Child tag name to node, in first-appearance order.
    Mapping(IndexMap<String, DataNode>),
}

impl DataNode {
    /// Create a scalar node.
    pub fn scalar(text: impl Into<String>) -> Self {
        Self::Scalar(text.into())
    }

    /// Short name of the node shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[DataNode]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, DataNode>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a child of a mapping node.
    pub fn get(&self, key: &str) -> Option<&DataNode> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Child keys of a mapping node, in document order. Empty for other shapes.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.as_mapping()
            .into_iter()
            .flat_map(|map| map.keys().map(String::as_str))
    }

    /// Rebuild the node as a plain JSON value (string, array or object).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// Deep trees would otherwise recurse once per level while dropping.
impl Drop for DataNode {
    fn drop(&mut self) {
        let mut pending: Vec<DataNode> = match self {
            Self::Scalar(_) => return,
            Self::Sequence(items) => std::mem::take(items),
            Self::Mapping(map) => std::mem::take(map).into_values().collect(),
        };
        while let Some(mut node) = pending.pop() {
            match &mut node {
                Self::Scalar(_) => {}
                Self::Sequence(items) => pending.append(items),
                Self::Mapping(map) => pending.extend(std::mem::take(map).into_values()),
            }
        }
    }
}

impl From<&str> for DataNode {
    fn from(text: &str) -> Self {
        Self::scalar(text)
    }
}
