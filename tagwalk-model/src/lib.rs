//! Type handler registry for tagwalk.
//!
//! Defines how domain types map onto the portable form:
//! - [`TypeHandler`]: predicate, encode and decode for one type id
//! - [`FnHandler`]: closure-backed handler used by `register_type`
//! - [`TypeRegistry`]: ordered handler list; first match wins
//! - [`DateHandler`] / [`PatternHandler`]: built-ins for `chrono` dates and
//!   `regex-lite` patterns
//!
//! The registry is a plain value. The engine takes ownership of it, so every
//! registration happens before any traversal reads it.

mod builtins;
mod error;
mod handler;
mod registry;

pub use builtins::{DateHandler, Pattern, PatternHandler, DATE_TYPE_ID, PATTERN_TYPE_ID};
pub use error::{RegistryError, RegistryResult};
pub use handler::{FnHandler, PayloadDecoder, PayloadEncoder, TypeHandler};
pub use registry::TypeRegistry;
