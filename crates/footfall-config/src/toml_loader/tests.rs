//! Tests for TOML config loading, creation, and path resolution.

use super::template::default_config_toml;
use super::*;
use crate::schema::FootfallConfig;
use footfall_common::ConfigError;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_footfall_config.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
port = 9090
trust_forwarded_for = true

[presence]
unknown_page = "(none)"
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.server.port, 9090);
    assert!(config.server.trust_forwarded_for);
    assert_eq!(config.presence.unknown_page, "(none)");
    // Defaults preserved
    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.presence.outbound_queue, 16);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let result = load_from_path(&path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn load_config_with_invalid_values_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
port = 4001

[presence]
outbound_queue = 0
"#,
    )
    .unwrap();

    match load_from_path(&path) {
        Err(ConfigError::ValidationError(msg)) => {
            assert!(msg.contains("presence.outbound_queue"));
            assert!(msg.contains("config.toml"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("footfall").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.server.port, 4000);
    assert!(!config.geo.enabled);
}

#[test]
fn create_default_config_keeps_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server]\nport = 9191\n").unwrap();

    create_default_config(&path).unwrap();
    assert_eq!(load_from_path(&path).unwrap().server.port, 9191);
}

#[test]
fn create_default_config_reports_unwritable_path() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let path = blocker.join("config.toml");

    let err = create_default_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::WriteFailed { ref path, .. } if path.starts_with(&blocker)));
}

#[test]
fn default_config_toml_is_valid() {
    let config: FootfallConfig = toml::from_str(&default_config_toml()).unwrap();
    assert_eq!(config.server.port, 4000);
}

#[test]
fn default_config_path_is_reasonable() {
    if let Ok(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("footfall"));
        assert!(path_str.ends_with("config.toml"));
    }
}
