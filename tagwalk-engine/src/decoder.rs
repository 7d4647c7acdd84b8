//! The reconstructor: tagged nodes back into a live value graph.

use crate::error::handler_error;
use crate::{EngineConfig, EngineError, EngineResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tagwalk_model::{PayloadDecoder, RegistryError, RegistryResult, TypeRegistry};
use tagwalk_types::{Fields, PlainForm, RefId, TaggedNode, Value};

/// State of an introduced reference id.
enum Slot {
    /// A typed value whose handler is still decoding its payload.
    Pending,
    /// A value back-references may resolve to. Containers are ready as soon
    /// as they are created, before their contents are filled in.
    Ready(Value),
}

/// Rebuilds values from tagged nodes.
pub(crate) struct Decoder<'a> {
    registry: &'a TypeRegistry,
    config: &'a EngineConfig,
    slots: HashMap<RefId, Slot>,
    depth: usize,
    nested: Option<EngineError>,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(registry: &'a TypeRegistry, config: &'a EngineConfig) -> Self {
        Self {
            registry,
            config,
            slots: HashMap::new(),
            depth: 0,
            nested: None,
        }
    }

    /// Number of reference ids introduced so far.
    pub(crate) fn introduced(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn unwalk(&mut self, node: &TaggedNode) -> EngineResult<Value> {
        match node {
            TaggedNode::Null => Ok(Value::Null),
            TaggedNode::Bool(b) => Ok(Value::Bool(*b)),
            TaggedNode::Number(n) => Ok(Value::Number(n.clone())),
            TaggedNode::String(s) => Ok(Value::String(s.clone())),
            TaggedNode::BackRef { ref_id } => self.resolve(*ref_id),
            TaggedNode::Typed {
                type_id,
                ref_id,
                payload,
            } => self.descend(|d| d.unwalk_typed(type_id, *ref_id, payload)),
            TaggedNode::Sequence { ref_id, items } => {
                self.descend(|d| d.unwalk_sequence(*ref_id, items))
            }
            TaggedNode::Mapping { ref_id, fields } => {
                self.descend(|d| d.unwalk_mapping(*ref_id, fields))
            }
        }
    }

    fn descend(
        &mut self,
        f: impl FnOnce(&mut Self) -> EngineResult<Value>,
    ) -> EngineResult<Value> {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            return Err(EngineError::DepthExceeded {
                depth,
                limit: self.config.max_depth,
            });
        }
        self.depth = depth;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn resolve(&self, ref_id: RefId) -> EngineResult<Value> {
        match self.slots.get(&ref_id) {
            Some(Slot::Ready(value)) => Ok(value.clone()),
            Some(Slot::Pending) => Err(EngineError::UnresolvedCycle { ref_id }),
            None => Err(EngineError::DanglingReference { ref_id }),
        }
    }

    fn reserve(&mut self, ref_id: Option<RefId>, slot: Slot) -> EngineResult<()> {
        let Some(ref_id) = ref_id else {
            return Ok(());
        };
        if self.slots.contains_key(&ref_id) {
            return Err(EngineError::DuplicateRefId { ref_id });
        }
        self.slots.insert(ref_id, slot);
        Ok(())
    }

    fn unwalk_typed(
        &mut self,
        type_id: &str,
        ref_id: Option<RefId>,
        payload: &PlainForm,
    ) -> EngineResult<Value> {
        let registry = self.registry;
        let handler = registry
            .lookup_by_id(type_id)
            .map_err(|_| EngineError::UnknownType {
                type_id: type_id.to_string(),
            })?;

        if let Some(shell) = handler.shell() {
            self.reserve(ref_id, Slot::Ready(shell.clone()))?;
            self.nested = None;
            let filled = handler
                .fill(&shell, payload, self)
                .map_err(|e| handler_error(type_id, e, &mut self.nested));
            self.nested = None;
            filled?;
            return Ok(shell);
        }

        self.reserve(ref_id, Slot::Pending)?;
        self.nested = None;
        let decoded = handler
            .decode(payload, self)
            .map_err(|e| handler_error(type_id, e, &mut self.nested));
        // Not carried past this handler, even when it recovered.
        self.nested = None;
        let value = decoded?;
        if let Some(ref_id) = ref_id {
            self.slots.insert(ref_id, Slot::Ready(value.clone()));
        }
        Ok(value)
    }

    fn unwalk_sequence(&mut self, ref_id: Option<RefId>, items: &[TaggedNode]) -> EngineResult<Value> {
        let list = Rc::new(RefCell::new(Vec::with_capacity(items.len())));
        self.reserve(ref_id, Slot::Ready(Value::List(Rc::clone(&list))))?;
        for item in items {
            let value = self.unwalk(item)?;
            list.borrow_mut().push(value);
        }
        Ok(Value::List(list))
    }

    fn unwalk_mapping(
        &mut self,
        ref_id: Option<RefId>,
        fields: &[(String, TaggedNode)],
    ) -> EngineResult<Value> {
        let map = Rc::new(RefCell::new(Fields::new()));
        self.reserve(ref_id, Slot::Ready(Value::Map(Rc::clone(&map))))?;
        for (key, node) in fields {
            let value = self.unwalk(node)?;
            map.borrow_mut().insert(key.as_str(), value);
        }
        Ok(Value::Map(map))
    }
}

impl PayloadDecoder for Decoder<'_> {
    fn extract(&mut self, payload: &PlainForm) -> RegistryResult<Value> {
        let result = TaggedNode::from_plain(payload)
            .map_err(EngineError::from)
            .and_then(|node| self.unwalk(&node));
        result.map_err(|e| {
            let message = e.to_string();
            self.nested = Some(e);
            RegistryError::Nested(message)
        })
    }
}
