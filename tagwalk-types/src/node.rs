//! The portable tagged representation.
//!
//! A [`TaggedNode`] serializes to plain JSON-compatible data:
//!
//! ```text
//! null | true | 1.5 | "text"                          scalars
//! {"refId": 3}                                        back-reference
//! {"typeId": "Date", "refId": 2, "payload": {...}}    registered type
//! {"refId": 1, "items": [ ... ]}                      sequence
//! {"refId": 1, "fields": [["key", ...], ...]}         mapping
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload produced by a type handler. Arbitrary JSON.
pub type PlainForm = serde_json::Value;

/// Per-call identifier assigned to an object on first visit.
///
/// Ids are dense and start at 1, in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefId(u32);

impl RefId {
    /// The first id handed out in a traversal.
    pub const FIRST: RefId = RefId(1);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The id following this one, or `None` once the id space is used up.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wire representation of one value.
///
/// Variant order matters for the untagged decoding: each object variant is
/// tried in turn, and the back-reference (only `refId`) must come last so it
/// does not swallow sequences and mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaggedNode {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),

    /// A value claimed by a registered type handler.
    Typed {
        #[serde(rename = "typeId")]
        type_id: String,
        #[serde(rename = "refId", default, skip_serializing_if = "Option::is_none")]
        ref_id: Option<RefId>,
        #[serde(default)]
        payload: PlainForm,
    },

    /// An ordered sequence. Plain structures without identity omit `refId`.
    Sequence {
        #[serde(rename = "refId", default, skip_serializing_if = "Option::is_none")]
        ref_id: Option<RefId>,
        items: Vec<TaggedNode>,
    },

    /// A string-keyed mapping, fields in insertion order.
    Mapping {
        #[serde(rename = "refId", default, skip_serializing_if = "Option::is_none")]
        ref_id: Option<RefId>,
        fields: Vec<(String, TaggedNode)>,
    },

    /// A pointer to an object introduced earlier in the same traversal.
    BackRef {
        #[serde(rename = "refId")]
        ref_id: RefId,
    },
}

impl TaggedNode {
    /// The id this node introduces, if any. Back-references introduce nothing.
    pub fn introduced_ref(&self) -> Option<RefId> {
        match self {
            TaggedNode::Typed { ref_id, .. }
            | TaggedNode::Sequence { ref_id, .. }
            | TaggedNode::Mapping { ref_id, .. } => *ref_id,
            _ => None,
        }
    }

    pub fn is_back_ref(&self) -> bool {
        matches!(self, TaggedNode::BackRef { .. })
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            TaggedNode::Null | TaggedNode::Bool(_) | TaggedNode::Number(_) | TaggedNode::String(_)
        )
    }

    /// Converts this node into a JSON value, for embedding inside a payload.
    pub fn to_plain(&self) -> crate::Result<PlainForm> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parses a node previously embedded with [`TaggedNode::to_plain`].
    pub fn from_plain(plain: &PlainForm) -> crate::Result<Self> {
        Ok(Self::deserialize(plain)?)
    }
}
