use pretty_assertions::assert_eq;
use std::io::Write;
use tagwalk_engine::{EngineConfig, EngineError, DEFAULT_MAX_DEPTH, DEFAULT_MAX_DOCUMENT_BYTES};
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ── Defaults and parsing ─────────────────────────────────────────

#[test]
fn defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(config.max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
    assert!(!config.warn_on_shadowed_handlers);
    assert!(!config.pretty_json);
}

#[test]
fn empty_document_is_all_defaults() {
    assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
}

#[test]
fn partial_document_keeps_other_defaults() {
    let config = EngineConfig::from_toml_str("max_depth = 10\npretty_json = true\n").unwrap();
    assert_eq!(
        config,
        EngineConfig {
            max_depth: 10,
            pretty_json: true,
            ..EngineConfig::default()
        }
    );
}

#[test]
fn invalid_document_is_a_config_error() {
    let err = EngineConfig::from_toml_str("max_depth = \"deep\"").unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
    assert!(err.to_string().starts_with("config error:"));
}

#[test]
fn builders_chain() {
    let config = EngineConfig::default()
        .with_max_depth(3)
        .with_max_document_bytes(1024)
        .with_shadow_warnings(true)
        .with_pretty_json(true);
    assert_eq!(
        config,
        EngineConfig {
            max_depth: 3,
            max_document_bytes: 1024,
            warn_on_shadowed_handlers: true,
            pretty_json: true,
        }
    );
}

// ── Loading from disk ────────────────────────────────────────────

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::load_from(dir.path().join("tagwalk.toml"));
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn valid_file_is_loaded() {
    let file = config_file(
        "max_depth = 64\nmax_document_bytes = 4096\nwarn_on_shadowed_handlers = true\n",
    );
    let config = EngineConfig::load_from(file.path());
    assert_eq!(config.max_depth, 64);
    assert_eq!(config.max_document_bytes, 4096);
    assert!(config.warn_on_shadowed_handlers);
    assert!(!config.pretty_json);
}

#[test]
fn unparsable_file_falls_back_to_defaults() {
    let file = config_file("max_depth = [1, 2");
    assert_eq!(EngineConfig::load_from(file.path()), EngineConfig::default());
}

#[test]
fn config_survives_toml_roundtrip() {
    let config = EngineConfig::default().with_max_depth(12).with_pretty_json(true);
    let text = toml::to_string(&config).unwrap();
    assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
}
