//! Ordered document tree for json-anchor.
//!
//! A [`DocNode`] is the input shape of a decode pass: scalars, arrays, and
//! objects whose fields keep document order. Documents are usually built from
//! [`serde_json::Value`] (parsed elsewhere) via the `From` bridges.
//!
//! # Example
//!
//! ```
//! use json_anchor_doc::DocNode;
//! use serde_json::json;
//!
//! let doc = DocNode::from(json!({"@id": 1, "name": "alpha"}));
//! assert!(doc.is_object());
//! assert_eq!(doc.get("@id").and_then(DocNode::as_u64), Some(1));
//! ```

use serde_json::Value;

/// A node in a document tree.
///
/// Object fields keep the order they appeared in the document; implicit
/// identity tags are assigned in that order, so it is load-bearing.
#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    /// A non-container JSON value (null, bool, number, string).
    Scalar(Value),
    /// Ordered sequence of nodes.
    Array(Vec<DocNode>),
    /// Ordered key-value pairs.
    Object(Vec<(String, DocNode)>),
}

impl DocNode {
    /// JSON null as a scalar node.
    pub fn null() -> Self {
        DocNode::Scalar(Value::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, DocNode::Scalar(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, DocNode::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, DocNode::Object(_))
    }

    /// Look up a field of an object node. `None` for non-objects and for
    /// absent keys. First occurrence wins when a key repeats.
    pub fn get(&self, key: &str) -> Option<&DocNode> {
        match self {
            DocNode::Object(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// The scalar payload, if this node is a scalar.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            DocNode::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Unsigned-integer view of a scalar node. Identity tags travel as
    /// non-negative integers.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            DocNode::Scalar(Value::Number(n)) => n.as_u64(),
            _ => None,
        }
    }

    /// Object fields in document order, empty for non-objects.
    pub fn fields(&self) -> &[(String, DocNode)] {
        match self {
            DocNode::Object(fields) => fields,
            _ => &[],
        }
    }
}

impl From<Value> for DocNode {
    fn from(v: Value) -> Self {
        match v {
            Value::Array(arr) => DocNode::Array(arr.into_iter().map(DocNode::from).collect()),
            Value::Object(obj) => DocNode::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, DocNode::from(v)))
                    .collect(),
            ),
            scalar => DocNode::Scalar(scalar),
        }
    }
}

impl From<DocNode> for Value {
    fn from(node: DocNode) -> Self {
        match node {
            DocNode::Scalar(v) => v,
            DocNode::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            DocNode::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}
