//! Error types for the registry and type handlers.

use thiserror::Error;

/// Result type for registry and handler operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised by the registry or by a handler's encode/decode.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A handler with this type id is already registered.
    #[error("type id already registered: {0}")]
    DuplicateTypeId(String),

    /// No handler is registered for this type id.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// The payload does not have the shape the handler expects, or the value
    /// handed to `encode` is not the handler's type.
    #[error("invalid payload for {type_id}: {message}")]
    Payload { type_id: String, message: String },

    /// Walking a sub-value through `embed`/`extract` failed. The engine keeps
    /// the original error and reports it in place of this one.
    #[error("nested value failed: {0}")]
    Nested(String),
}

impl RegistryError {
    /// Shorthand for a [`RegistryError::Payload`].
    pub fn payload(type_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Payload {
            type_id: type_id.into(),
            message: message.into(),
        }
    }
}
