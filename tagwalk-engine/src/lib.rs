//! Reference-tracking serialization engine for tagwalk.
//!
//! Converts a [`Value`] graph into a [`TaggedNode`] tree and back:
//!
//! - Scalars pass through unchanged.
//! - Every list, map and custom value gets a [`RefId`](tagwalk_types::RefId)
//!   on first visit; later visits emit a back-reference, so shared objects
//!   are written once and cycles terminate.
//! - Values claimed by a registered handler are written as typed nodes and
//!   rebuilt through the same handler.
//!
//! # Architecture
//!
//! - `encoder`: the walker plus its reference table (one per call)
//! - `decoder`: the reconstructor; containers are registered before their
//!   contents are decoded so cycles resolve
//! - `codec`: JSON encoding of the node tree with a size limit
//! - `config`: depth and size limits, loadable from TOML
//!
//! An [`Engine`] owns its registry behind an `Arc` and never mutates it, so
//! one engine can serve calls from many threads. Each call keeps its state
//! on the stack of the calling thread.

mod codec;
mod config;
mod decoder;
mod encoder;
mod error;

pub use codec::MAX_JSON_NESTING;
pub use config::{EngineConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_DOCUMENT_BYTES};
pub use encoder::SerializeStats;
pub use error::{EngineError, EngineResult};

use decoder::Decoder;
use encoder::Encoder;
use std::sync::Arc;
use tagwalk_model::TypeRegistry;
use tagwalk_types::{TaggedNode, Value};
use tracing::debug;

/// Serializes and deserializes value graphs against a fixed registry.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<TypeRegistry>,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the default configuration.
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: TypeRegistry, config: EngineConfig) -> Self {
        Self::from_shared(Arc::new(registry), config)
    }

    /// Creates an engine over a registry shared with other engines.
    pub fn from_shared(registry: Arc<TypeRegistry>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Walks `value` into its tagged form.
    pub fn serialize(&self, value: &Value) -> EngineResult<TaggedNode> {
        self.serialize_with_stats(value).map(|(node, _)| node)
    }

    /// Walks `value` and reports how many objects and back-references the
    /// walk produced.
    pub fn serialize_with_stats(&self, value: &Value) -> EngineResult<(TaggedNode, SerializeStats)> {
        let mut encoder = Encoder::new(&self.registry, &self.config);
        let node = encoder.walk(value)?;
        let stats = encoder.finish();
        debug!(
            objects = stats.objects,
            back_refs = stats.back_refs,
            max_depth = stats.max_depth,
            "Serialized value graph"
        );
        Ok((node, stats))
    }

    /// Rebuilds a value graph from its tagged form.
    pub fn deserialize(&self, node: &TaggedNode) -> EngineResult<Value> {
        let mut decoder = Decoder::new(&self.registry, &self.config);
        let value = decoder.unwalk(node)?;
        debug!(objects = decoder.introduced(), "Deserialized value graph");
        Ok(value)
    }
}
