//! Core type definitions for tagwalk.
//!
//! This crate defines the data that flows through the serialization engine:
//! - [`Value`]: the in-memory graph (scalars plus identity-bearing lists,
//!   maps and custom domain values)
//! - [`Fields`]: insertion-ordered string-keyed storage behind maps
//! - [`CustomValue`]: the object-safe view of a caller-defined domain type
//! - [`TaggedNode`]: the portable wire shape, carrying type ids and
//!   reference ids
//!
//! Nothing here knows about registries or traversal; see `tagwalk-model`
//! and `tagwalk-engine`.

mod custom;
mod fields;
mod node;
mod value;

pub use custom::CustomValue;
pub use fields::Fields;
pub use node::{PlainForm, RefId, TaggedNode};
pub use value::{CustomRef, Identity, ListRef, MapRef, Value};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("non-finite number {0} has no portable form")]
    NonFiniteNumber(f64),
}
