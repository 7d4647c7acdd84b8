//! Engine configuration, optionally read from a TOML file.
//!
//! ```toml
//! max_depth = 256
//! max_document_bytes = 1048576
//! warn_on_shadowed_handlers = true
//! pretty_json = false
//! ```

use crate::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Default nesting limit for walk and unwalk.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default size limit for encoded JSON documents (16 MB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

/// Limits and diagnostics applied to every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of nested lists, maps and typed values on one path.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum size of a JSON document accepted or produced by the codec.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,

    /// Log a warning when a value matches more than one handler.
    #[serde(default)]
    pub warn_on_shadowed_handlers: bool,

    /// Indent JSON produced by the codec.
    #[serde(default)]
    pub pretty_json: bool,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_document_bytes() -> usize {
    DEFAULT_MAX_DOCUMENT_BYTES
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            warn_on_shadowed_handlers: false,
            pretty_json: false,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> EngineResult<Self> {
        toml::from_str(contents).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Loads configuration from `path`.
    ///
    /// A missing file yields the defaults. An unreadable or unparsable file
    /// also yields the defaults, with a warning.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No engine config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!(max_depth = config.max_depth, "Loaded engine config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse engine config {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read engine config {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Sets the nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the document size limit.
    #[must_use]
    pub fn with_max_document_bytes(mut self, max_document_bytes: usize) -> Self {
        self.max_document_bytes = max_document_bytes;
        self
    }

    /// Enables or disables shadowed-handler warnings.
    #[must_use]
    pub fn with_shadow_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_shadowed_handlers = enabled;
        self
    }

    /// Enables or disables indented JSON output.
    #[must_use]
    pub fn with_pretty_json(mut self, enabled: bool) -> Self {
        self.pretty_json = enabled;
        self
    }
}
