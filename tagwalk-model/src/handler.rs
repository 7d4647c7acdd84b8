use crate::{RegistryError, RegistryResult};
use std::fmt;
use tagwalk_types::{PlainForm, Value};

/// Walks sub-values on behalf of a handler during serialization.
///
/// Implemented by the engine's walker. Sub-values embedded this way take part
/// in reference tracking, so sharing and cycles through a custom type survive.
pub trait PayloadEncoder {
    /// Walks `value` and returns its tagged form as JSON.
    fn embed(&mut self, value: &Value) -> RegistryResult<PlainForm>;
}

/// Rebuilds sub-values on behalf of a handler during deserialization.
pub trait PayloadDecoder {
    /// Reconstructs a value previously produced by [`PayloadEncoder::embed`].
    fn extract(&mut self, payload: &PlainForm) -> RegistryResult<Value>;
}

/// Converts one domain type to and from its portable payload.
///
/// Handlers are consulted in registration order; the first whose
/// [`matches`](TypeHandler::matches) returns `true` encodes the value.
///
/// Self-referential types (a node whose payload can reach the node itself)
/// implement [`shell`](TypeHandler::shell) and [`fill`](TypeHandler::fill)
/// instead of relying on [`decode`](TypeHandler::decode): the shell is
/// registered under the node's reference id before the payload is decoded,
/// so back-references inside the payload resolve to it.
pub trait TypeHandler: Send + Sync {
    /// Stable identifier written to the wire as `typeId`.
    fn type_id(&self) -> &str;

    /// Returns `true` if this handler encodes `value`.
    fn matches(&self, value: &Value) -> bool;

    /// Produces the payload for `value`.
    fn encode(&self, value: &Value, encoder: &mut dyn PayloadEncoder) -> RegistryResult<PlainForm>;

    /// Rebuilds a value from its payload.
    fn decode(&self, payload: &PlainForm, decoder: &mut dyn PayloadDecoder) -> RegistryResult<Value>;

    /// An empty value to register before the payload is decoded.
    fn shell(&self) -> Option<Value> {
        None
    }

    /// Populates a value obtained from [`shell`](TypeHandler::shell).
    fn fill(
        &self,
        shell: &Value,
        payload: &PlainForm,
        decoder: &mut dyn PayloadDecoder,
    ) -> RegistryResult<()> {
        let _ = (shell, payload, decoder);
        Err(RegistryError::payload(
            self.type_id(),
            "handler does not support two-phase decoding",
        ))
    }
}

type Predicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;
type EncodeFn = Box<dyn Fn(&Value, &mut dyn PayloadEncoder) -> RegistryResult<PlainForm> + Send + Sync>;
type DecodeFn = Box<dyn Fn(&PlainForm, &mut dyn PayloadDecoder) -> RegistryResult<Value> + Send + Sync>;

/// A handler assembled from closures.
pub struct FnHandler {
    type_id: String,
    predicate: Predicate,
    encode: EncodeFn,
    decode: DecodeFn,
}

impl FnHandler {
    /// Creates a handler whose closures may walk sub-values.
    pub fn new<P, E, D>(type_id: impl Into<String>, predicate: P, encode: E, decode: D) -> Self
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
        E: Fn(&Value, &mut dyn PayloadEncoder) -> RegistryResult<PlainForm> + Send + Sync + 'static,
        D: Fn(&PlainForm, &mut dyn PayloadDecoder) -> RegistryResult<Value> + Send + Sync + 'static,
    {
        Self {
            type_id: type_id.into(),
            predicate: Box::new(predicate),
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }

    /// Creates a handler for leaf types whose payload holds no graph values.
    pub fn plain<P, E, D>(type_id: impl Into<String>, predicate: P, encode: E, decode: D) -> Self
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
        E: Fn(&Value) -> RegistryResult<PlainForm> + Send + Sync + 'static,
        D: Fn(&PlainForm) -> RegistryResult<Value> + Send + Sync + 'static,
    {
        Self::new(
            type_id,
            predicate,
            move |value, _| encode(value),
            move |payload, _| decode(payload),
        )
    }
}

impl TypeHandler for FnHandler {
    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn matches(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    fn encode(&self, value: &Value, encoder: &mut dyn PayloadEncoder) -> RegistryResult<PlainForm> {
        (self.encode)(value, encoder)
    }

    fn decode(&self, payload: &PlainForm, decoder: &mut dyn PayloadDecoder) -> RegistryResult<Value> {
        (self.decode)(payload, decoder)
    }
}

impl fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("type_id", &self.type_id)
            .finish_non_exhaustive()
    }
}
