//! Error types for the engine.

use tagwalk_model::RegistryError;
use tagwalk_types::RefId;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that end a serialize or deserialize call.
///
/// None of these leave partial output behind, and none affect the registry.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A custom value has no registered handler.
    #[error("unsupported type: {type_name}")]
    UnsupportedType { type_name: String },

    /// A typed node names a type id the registry does not know.
    #[error("unknown type: {type_id}")]
    UnknownType { type_id: String },

    /// A back-reference names an id never introduced.
    #[error("dangling reference: refId {ref_id}")]
    DanglingReference { ref_id: RefId },

    /// The graph is nested deeper than the configured limit. When raised by
    /// the JSON codec, both numbers count JSON nesting levels.
    #[error("depth {depth} exceeds limit {limit}")]
    DepthExceeded { depth: usize, limit: usize },

    /// A back-reference points into a typed value still being decoded by a
    /// handler that cannot provide a shell.
    #[error("unresolved cycle through refId {ref_id}")]
    UnresolvedCycle { ref_id: RefId },

    /// Two nodes introduce the same id.
    #[error("duplicate refId {ref_id}")]
    DuplicateRefId { ref_id: RefId },

    /// The walk met more distinct objects than reference ids exist.
    #[error("reference ids exhausted")]
    RefIdsExhausted,

    /// A handler rejected its value or payload.
    #[error("handler {type_id} failed: {message}")]
    Handler { type_id: String, message: String },

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A payload embedded by a handler is not a valid node.
    #[error(transparent)]
    Node(#[from] tagwalk_types::Error),

    /// An encoded document is larger than the configured limit.
    #[error("document too large: {size} bytes (limit {limit})")]
    DocumentTooLarge { size: usize, limit: usize },

    /// A configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

/// Converts a handler failure into an engine error.
///
/// A [`RegistryError::Nested`] stands for an engine error raised while the
/// handler walked a sub-value; that original error is returned instead so the
/// caller sees, for example, `DepthExceeded` rather than a handler message.
pub(crate) fn handler_error(
    type_id: &str,
    err: RegistryError,
    nested: &mut Option<EngineError>,
) -> EngineError {
    match err {
        RegistryError::Nested(message) => nested.take().unwrap_or(EngineError::Handler {
            type_id: type_id.to_string(),
            message,
        }),
        RegistryError::UnknownType(type_id) => EngineError::UnknownType { type_id },
        other => EngineError::Handler {
            type_id: type_id.to_string(),
            message: other.to_string(),
        },
    }
}
