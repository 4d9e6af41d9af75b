use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::extension::path::{Path, PathSegment};

/// Object node storage. Keeps insertion order so a tree always flattens the
/// same way.
pub type ValueMap = IndexMap<String, ValueNode>;

/// A JSON primitive.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// Hierarchical header value. Array gaps are `Scalar(Null)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ValueNode {
    Scalar(Scalar),
    Object(ValueMap),
    Array(Vec<ValueNode>),
}

impl Default for ValueNode {
    fn default() -> Self {
        ValueNode::Scalar(Scalar::Null)
    }
}

impl ValueNode {
    pub const NULL: ValueNode = ValueNode::Scalar(Scalar::Null);

    pub fn object() -> Self {
        ValueNode::Object(ValueMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ValueNode::Scalar(Scalar::Null))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, ValueNode::Scalar(_))
    }

    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            ValueNode::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ValueMap> {
        match self {
            ValueNode::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ValueNode]> {
        match self {
            ValueNode::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ValueNode::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ValueNode::Scalar(Scalar::Number(n)) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ValueNode::Scalar(Scalar::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ValueNode::Scalar(Scalar::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    /// Object member lookup; `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&ValueNode> {
        self.as_object()?.get(key)
    }

    /// Follows `path` from this node.
    pub fn get_path(&self, path: &Path) -> Option<&ValueNode> {
        self.get_segments(path.segments())
    }

    pub fn get_segments(&self, segments: &[PathSegment]) -> Option<&ValueNode> {
        segments
            .iter()
            .try_fold(self, |node, segment| match (segment, node) {
                (PathSegment::Field(name), ValueNode::Object(map)) => map.get(name),
                (PathSegment::Index(index), ValueNode::Array(items)) => items.get(*index),
                _ => None,
            })
    }
}

impl From<Value> for ValueNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ValueNode::Scalar(Scalar::Null),
            Value::Bool(b) => ValueNode::Scalar(Scalar::Bool(b)),
            Value::Number(n) => ValueNode::Scalar(Scalar::Number(n)),
            Value::String(s) => ValueNode::Scalar(Scalar::String(s)),
            Value::Array(items) => ValueNode::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                ValueNode::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<ValueNode> for Value {
    fn from(node: ValueNode) -> Self {
        match node {
            ValueNode::Scalar(Scalar::Null) => Value::Null,
            ValueNode::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            ValueNode::Scalar(Scalar::Number(n)) => Value::Number(n),
            ValueNode::Scalar(Scalar::String(s)) => Value::String(s),
            ValueNode::Array(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            ValueNode::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&ValueNode> for Value {
    fn from(node: &ValueNode) -> Self {
        node.clone().into()
    }
}

impl From<&str> for ValueNode {
    fn from(s: &str) -> Self {
        ValueNode::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for ValueNode {
    fn from(s: String) -> Self {
        ValueNode::Scalar(Scalar::String(s))
    }
}

impl From<bool> for ValueNode {
    fn from(b: bool) -> Self {
        ValueNode::Scalar(Scalar::Bool(b))
    }
}

impl From<u64> for ValueNode {
    fn from(n: u64) -> Self {
        ValueNode::Scalar(Scalar::Number(n.into()))
    }
}

impl From<i64> for ValueNode {
    fn from(n: i64) -> Self {
        ValueNode::Scalar(Scalar::Number(n.into()))
    }
}

impl From<usize> for ValueNode {
    fn from(n: usize) -> Self {
        ValueNode::Scalar(Scalar::Number((n as u64).into()))
    }
}

/// Non-finite floats have no JSON form and become null.
impl From<f64> for ValueNode {
    fn from(x: f64) -> Self {
        Number::from_f64(x)
            .map(|n| ValueNode::Scalar(Scalar::Number(n)))
            .unwrap_or_default()
    }
}

impl<T: Into<ValueNode>> From<Vec<T>> for ValueNode {
    fn from(items: Vec<T>) -> Self {
        ValueNode::Array(items.into_iter().map(Into::into).collect())
    }
}
