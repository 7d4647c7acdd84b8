//! The value walker and its per-call reference table.

use crate::error::handler_error;
use crate::{EngineConfig, EngineError, EngineResult};
use serde::Serialize;
use std::collections::HashMap;
use tagwalk_model::{PayloadEncoder, RegistryError, RegistryResult, TypeRegistry};
use tagwalk_types::{Identity, PlainForm, RefId, TaggedNode, Value};
use tracing::warn;

/// Counters collected during one serialize call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SerializeStats {
    /// Distinct objects assigned a reference id.
    pub objects: usize,
    /// Back-references emitted for shared or cyclic objects.
    pub back_refs: usize,
    /// Deepest nesting reached.
    pub max_depth: usize,
}

/// Maps object identity to the id assigned on first visit.
///
/// Every visited object is retained until the walk ends. Identities are
/// allocation addresses, and a handler may embed temporaries; holding them
/// keeps an address from being reused by a later allocation in the same walk.
struct ReferenceTable {
    ids: HashMap<Identity, RefId>,
    retained: Vec<Value>,
    next: Option<RefId>,
}

impl ReferenceTable {
    fn new() -> Self {
        Self {
            ids: HashMap::new(),
            retained: Vec::new(),
            next: Some(RefId::FIRST),
        }
    }

    fn get(&self, identity: Identity) -> Option<RefId> {
        self.ids.get(&identity).copied()
    }

    fn assign(&mut self, identity: Identity, value: &Value) -> EngineResult<RefId> {
        let id = self.next.ok_or(EngineError::RefIdsExhausted)?;
        self.next = id.next();
        self.ids.insert(identity, id);
        self.retained.push(value.clone());
        Ok(id)
    }

    fn len(&self) -> usize {
        self.retained.len()
    }
}

/// Walks a value graph into tagged nodes.
pub(crate) struct Encoder<'a> {
    registry: &'a TypeRegistry,
    config: &'a EngineConfig,
    refs: ReferenceTable,
    depth: usize,
    stats: SerializeStats,
    nested: Option<EngineError>,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(registry: &'a TypeRegistry, config: &'a EngineConfig) -> Self {
        Self {
            registry,
            config,
            refs: ReferenceTable::new(),
            depth: 0,
            stats: SerializeStats::default(),
            nested: None,
        }
    }

    pub(crate) fn finish(self) -> SerializeStats {
        SerializeStats {
            objects: self.refs.len(),
            ..self.stats
        }
    }

    pub(crate) fn walk(&mut self, value: &Value) -> EngineResult<TaggedNode> {
        let Some(identity) = value.identity() else {
            return Ok(scalar_node(value));
        };

        if let Some(ref_id) = self.refs.get(identity) {
            self.stats.back_refs += 1;
            return Ok(TaggedNode::BackRef { ref_id });
        }

        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            return Err(EngineError::DepthExceeded {
                depth,
                limit: self.config.max_depth,
            });
        }
        let ref_id = self.refs.assign(identity, value)?;

        self.depth = depth;
        self.stats.max_depth = self.stats.max_depth.max(depth);
        let node = self.walk_object(value, ref_id);
        self.depth -= 1;
        node
    }

    fn walk_object(&mut self, value: &Value, ref_id: RefId) -> EngineResult<TaggedNode> {
        let registry = self.registry;
        if let Some(handler) = registry.lookup(value) {
            let type_id = handler.type_id();
            if self.config.warn_on_shadowed_handlers {
                self.report_shadowed(value, type_id);
            }
            self.nested = None;
            let payload = handler
                .encode(value, self)
                .map_err(|e| handler_error(type_id, e, &mut self.nested));
            // Not carried past this handler, even when it recovered.
            self.nested = None;
            let payload = payload?;
            return Ok(TaggedNode::Typed {
                type_id: type_id.to_string(),
                ref_id: Some(ref_id),
                payload,
            });
        }

        match value {
            Value::List(list) => {
                let elements = list.borrow();
                let items = elements
                    .iter()
                    .map(|item| self.walk(item))
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(TaggedNode::Sequence {
                    ref_id: Some(ref_id),
                    items,
                })
            }
            Value::Map(map) => {
                let entries = map.borrow();
                let fields = entries
                    .iter()
                    .map(|(key, item)| Ok((key.to_string(), self.walk(item)?)))
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(TaggedNode::Mapping {
                    ref_id: Some(ref_id),
                    fields,
                })
            }
            Value::Custom(custom) => Err(EngineError::UnsupportedType {
                type_name: (**custom).type_name().to_string(),
            }),
            _ => Ok(scalar_node(value)),
        }
    }

    fn report_shadowed(&self, value: &Value, winner: &str) {
        let shadowed: Vec<&str> = self
            .registry
            .lookup_all(value)
            .map(|h| h.type_id())
            .filter(|id| *id != winner)
            .collect();
        if !shadowed.is_empty() {
            warn!(
                type_id = winner,
                shadowed = ?shadowed,
                "Value matches more than one type handler; the first registered wins"
            );
        }
    }
}

impl PayloadEncoder for Encoder<'_> {
    fn embed(&mut self, value: &Value) -> RegistryResult<PlainForm> {
        let result = self
            .walk(value)
            .and_then(|node| node.to_plain().map_err(EngineError::from));
        result.map_err(|e| {
            let message = e.to_string();
            self.nested = Some(e);
            RegistryError::Nested(message)
        })
    }
}

/// Scalars map onto their node variant; containers never reach here.
fn scalar_node(value: &Value) -> TaggedNode {
    match value {
        Value::Bool(b) => TaggedNode::Bool(*b),
        Value::Number(n) => TaggedNode::Number(n.clone()),
        Value::String(s) => TaggedNode::String(s.clone()),
        _ => TaggedNode::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_table_assigns_dense_ids() {
        let mut refs = ReferenceTable::new();
        let (a, b) = (Value::list([]), Value::list([]));
        let first = refs.assign(a.identity().unwrap(), &a).unwrap();
        let second = refs.assign(b.identity().unwrap(), &b).unwrap();

        assert_eq!(first, RefId::FIRST);
        assert_eq!(second, RefId::new(2));
        assert_eq!(refs.get(a.identity().unwrap()), Some(first));
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn reference_table_reports_exhaustion() {
        let mut refs = ReferenceTable::new();
        refs.next = Some(RefId::new(u32::MAX));
        let (a, b) = (Value::list([]), Value::list([]));

        assert_eq!(refs.assign(a.identity().unwrap(), &a).unwrap(), RefId::new(u32::MAX));
        assert!(matches!(
            refs.assign(b.identity().unwrap(), &b),
            Err(EngineError::RefIdsExhausted)
        ));
    }
}
