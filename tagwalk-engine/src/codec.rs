//! JSON encoding of tagged nodes.
//!
//! `serde_json` refuses documents nested deeper than [`MAX_JSON_NESTING`]
//! arrays and objects. A sequence costs two levels per graph level and a
//! mapping three, so the codec bounds what it writes by that same limit
//! rather than producing a document it cannot read back. Both directions
//! report the bound as [`EngineError::DepthExceeded`].

use crate::{Engine, EngineError, EngineResult};
use tagwalk_types::{PlainForm, TaggedNode, Value};

/// Deepest array/object nesting `serde_json` parses.
pub const MAX_JSON_NESTING: usize = 127;

impl Engine {
    /// Serializes `value` and encodes the node tree as JSON bytes.
    pub fn to_json_vec(&self, value: &Value) -> EngineResult<Vec<u8>> {
        let node = self.serialize(value)?;
        check_nesting(&node)?;
        let data = if self.config().pretty_json {
            serde_json::to_vec_pretty(&node)?
        } else {
            serde_json::to_vec(&node)?
        };
        self.check_document_size(data.len())?;
        Ok(data)
    }

    /// Serializes `value` and encodes the node tree as a JSON string.
    pub fn to_json_string(&self, value: &Value) -> EngineResult<String> {
        let node = self.serialize(value)?;
        check_nesting(&node)?;
        let text = if self.config().pretty_json {
            serde_json::to_string_pretty(&node)?
        } else {
            serde_json::to_string(&node)?
        };
        self.check_document_size(text.len())?;
        Ok(text)
    }

    /// Decodes JSON bytes into a node tree and rebuilds the value graph.
    pub fn from_json_slice(&self, data: &[u8]) -> EngineResult<Value> {
        self.check_document_size(data.len())?;
        let node: TaggedNode = serde_json::from_slice(data).map_err(parse_error)?;
        self.deserialize(&node)
    }

    /// Decodes a JSON string into a node tree and rebuilds the value graph.
    pub fn from_json_str(&self, text: &str) -> EngineResult<Value> {
        self.from_json_slice(text.as_bytes())
    }

    fn check_document_size(&self, size: usize) -> EngineResult<()> {
        let limit = self.config().max_document_bytes;
        if size > limit {
            return Err(EngineError::DocumentTooLarge { size, limit });
        }
        Ok(())
    }
}

fn check_nesting(node: &TaggedNode) -> EngineResult<()> {
    let depth = node_nesting(node);
    if depth > MAX_JSON_NESTING {
        return Err(EngineError::DepthExceeded {
            depth,
            limit: MAX_JSON_NESTING,
        });
    }
    Ok(())
}

/// Array/object nesting of the JSON written for `node`.
fn node_nesting(node: &TaggedNode) -> usize {
    match node {
        TaggedNode::Null | TaggedNode::Bool(_) | TaggedNode::Number(_) | TaggedNode::String(_) => 0,
        TaggedNode::BackRef { .. } => 1,
        TaggedNode::Typed { payload, .. } => 1 + plain_nesting(payload),
        // {"items": [ .. ]}
        TaggedNode::Sequence { items, .. } => 2 + items.iter().map(node_nesting).max().unwrap_or(0),
        // {"fields": [["key", ..], ..]}
        TaggedNode::Mapping { fields, .. } => fields
            .iter()
            .map(|(_, node)| 3 + node_nesting(node))
            .max()
            .unwrap_or(2),
    }
}

fn plain_nesting(plain: &PlainForm) -> usize {
    match plain {
        PlainForm::Array(items) => 1 + items.iter().map(plain_nesting).max().unwrap_or(0),
        PlainForm::Object(map) => 1 + map.values().map(plain_nesting).max().unwrap_or(0),
        _ => 0,
    }
}

/// The parser's nesting limit surfaces as a depth error like every other
/// depth limit.
fn parse_error(err: serde_json::Error) -> EngineError {
    if err.to_string().starts_with("recursion limit exceeded") {
        return EngineError::DepthExceeded {
            depth: MAX_JSON_NESTING + 1,
            limit: MAX_JSON_NESTING,
        };
    }
    EngineError::Serialization(err)
}
