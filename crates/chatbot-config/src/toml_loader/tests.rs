//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_chatbot_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, chatbot_common::ConfigError::FileNotFound(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r##"
[server]
port = 9090

[window]
max_tokens = 200
start_on = "any"
"##,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.window.max_tokens, 200);
    assert_eq!(config.window.start_on, crate::schema::StartOn::Any);
    // Defaults preserved
    assert_eq!(config.model.name, "gemini-2.5-flash");
    assert_eq!(config.prompt.default_language, "English");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, chatbot_common::ConfigError::ParseError(_)));
}

#[test]
fn load_out_of_range_values_returns_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[model]
temperature = 9.5
"#,
    )
    .unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, chatbot_common::ConfigError::ValidationError(_)));
    assert!(err.to_string().contains("model.temperature"));
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chatbot").join("config.toml");

    assert!(create_default_config(&path).unwrap());
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.window.max_tokens, 65);
    assert_eq!(config.store.max_threads, 1000);
}

#[test]
fn create_default_config_keeps_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[window]\nmax_tokens = 200\n").unwrap();

    assert!(!create_default_config(&path).unwrap());
    let config = load_from_path(&path).unwrap();
    assert_eq!(config.window.max_tokens, 200);
}

#[test]
fn default_config_toml_is_valid() {
    use super::template::default_config_toml;

    let config = parse_str(&default_config_toml()).unwrap();
    assert_eq!(config.server.port, 8000);
}

#[test]
fn default_config_path_is_reasonable() {
    // Not every CI sandbox has a config dir.
    if let Ok(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("chatbot"));
        assert!(path_str.ends_with("config.toml"));
    }
}

#[test]
fn default_config_notes_include_system_has_no_server_effect() {
    use super::template::default_config_toml;

    let template = default_config_toml();
    let line = template
        .lines()
        .find(|line| line.contains("include_system"))
        .unwrap();
    assert!(line.contains("no effect on the server"));
}
