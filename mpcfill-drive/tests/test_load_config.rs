use mpcfill_drive_core::config::Config;
use mpcfill_drive_core::manifest::{DEFAULT_CARDBACK, DEFAULT_STOCK};
use pretty_assertions::assert_eq;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Every section given explicitly.
#[test]
fn test_load_config_full_file() {
    let config_yaml = r#"
output_dir: ./tmp/orders
fetch:
  timeout_secs: 10
  user_agent: "test-agent/1.0"
manifest:
  stock: "(S33) Superior Smooth"
  foil: true
  cardback: "1CustomBackAbCdEf"
traversal:
  max_depth: 2
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config =
        mpcfill_drive::load_config::load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.output_dir, PathBuf::from("./tmp/orders"));
    assert_eq!(config.fetch.timeout_secs, 10);
    assert_eq!(config.fetch.user_agent, "test-agent/1.0");
    assert_eq!(config.manifest.stock, "(S33) Superior Smooth");
    assert!(config.manifest.foil);
    assert_eq!(config.manifest.cardback, "1CustomBackAbCdEf");
    assert_eq!(config.traversal.max_depth, 2);
}

/// Missing sections and keys fall back to the defaults.
#[test]
fn test_load_config_partial_file_uses_defaults() {
    let config_yaml = r#"
manifest:
  foil: true
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = mpcfill_drive::load_config::load_config(config_file.path())
        .expect("Partial config should load");

    let defaults = Config::default();
    assert_eq!(config.output_dir, defaults.output_dir);
    assert_eq!(config.fetch, defaults.fetch);
    assert_eq!(config.traversal, defaults.traversal);
    assert!(config.manifest.foil);
    assert_eq!(config.manifest.stock, DEFAULT_STOCK);
    assert_eq!(config.manifest.cardback, DEFAULT_CARDBACK);
}

#[test]
fn test_load_config_empty_file_is_all_defaults() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "").unwrap();

    let config = mpcfill_drive::load_config::load_config(config_file.path())
        .expect("Empty config should load");

    assert_eq!(config, Config::default());
}

#[test]
fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    let err = mpcfill_drive::load_config::load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
fn test_load_config_errors_for_missing_file() {
    let err = mpcfill_drive::load_config::load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(
        err.to_string().contains("Failed to read config file"),
        "Read error expected, got: {err}"
    );
}
