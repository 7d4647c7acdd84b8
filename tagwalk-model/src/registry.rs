use crate::builtins::{DateHandler, PatternHandler};
use crate::{FnHandler, PayloadDecoder, PayloadEncoder, RegistryError, RegistryResult, TypeHandler};
use std::collections::HashMap;
use std::fmt;
use tagwalk_types::{PlainForm, Value};
use tracing::debug;

/// Ordered collection of type handlers.
///
/// Lookup by value evaluates predicates in registration order and the first
/// match wins. A later handler whose predicate overlaps an earlier one is
/// never consulted for the overlapping values; [`lookup_all`] exposes every
/// match so callers can detect that.
///
/// Registration takes `&mut self`. Once the registry is handed to the engine
/// it is shared read-only.
///
/// [`lookup_all`]: TypeRegistry::lookup_all
#[derive(Default)]
pub struct TypeRegistry {
    handlers: Vec<Box<dyn TypeHandler>>,
    by_id: HashMap<String, usize>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry preloaded with the `Date` and `RegExp` handlers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.handlers.push(Box::new(DateHandler));
        registry.handlers.push(Box::new(PatternHandler));
        registry.reindex();
        registry
    }

    /// Appends a handler. Fails if its type id is already taken.
    pub fn register(&mut self, handler: impl TypeHandler + 'static) -> RegistryResult<()> {
        let type_id = handler.type_id().to_string();
        if self.by_id.contains_key(&type_id) {
            return Err(RegistryError::DuplicateTypeId(type_id));
        }
        debug!(type_id = %type_id, position = self.handlers.len(), "Registered type handler");
        self.by_id.insert(type_id, self.handlers.len());
        self.handlers.push(Box::new(handler));
        Ok(())
    }

    /// Registers a closure-backed handler whose encode/decode may walk
    /// sub-values.
    pub fn register_type<P, E, D>(
        &mut self,
        type_id: impl Into<String>,
        predicate: P,
        encode: E,
        decode: D,
    ) -> RegistryResult<()>
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
        E: Fn(&Value, &mut dyn PayloadEncoder) -> RegistryResult<PlainForm> + Send + Sync + 'static,
        D: Fn(&PlainForm, &mut dyn PayloadDecoder) -> RegistryResult<Value> + Send + Sync + 'static,
    {
        self.register(FnHandler::new(type_id, predicate, encode, decode))
    }

    /// Registers a closure-backed handler for a leaf type.
    pub fn register_plain_type<P, E, D>(
        &mut self,
        type_id: impl Into<String>,
        predicate: P,
        encode: E,
        decode: D,
    ) -> RegistryResult<()>
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
        E: Fn(&Value) -> RegistryResult<PlainForm> + Send + Sync + 'static,
        D: Fn(&PlainForm) -> RegistryResult<Value> + Send + Sync + 'static,
    {
        self.register(FnHandler::plain(type_id, predicate, encode, decode))
    }

    /// The first handler whose predicate accepts `value`.
    pub fn lookup(&self, value: &Value) -> Option<&dyn TypeHandler> {
        self.handlers
            .iter()
            .find(|h| h.matches(value))
            .map(|h| &**h)
    }

    /// Every handler whose predicate accepts `value`, in registration order.
    pub fn lookup_all<'a>(&'a self, value: &'a Value) -> impl Iterator<Item = &'a dyn TypeHandler> + 'a {
        self.handlers
            .iter()
            .filter(move |h| h.matches(value))
            .map(|h| &**h)
    }

    /// The handler registered under `type_id`.
    pub fn lookup_by_id(&self, type_id: &str) -> RegistryResult<&dyn TypeHandler> {
        self.by_id
            .get(type_id)
            .map(|&pos| &*self.handlers[pos])
            .ok_or_else(|| RegistryError::UnknownType(type_id.to_string()))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.by_id.contains_key(type_id)
    }

    /// Registered type ids in registration order.
    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|h| h.type_id())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn reindex(&mut self) {
        self.by_id = self
            .handlers
            .iter()
            .enumerate()
            .map(|(pos, h)| (h.type_id().to_string(), pos))
            .collect();
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("type_ids", &self.type_ids().collect::<Vec<_>>())
            .finish()
    }
}
