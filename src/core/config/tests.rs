use super::data::Config;
use super::defaults::DEFAULT_BASE_URL;
use super::io::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        base_url: Some("http://gen.internal:8080".to_string()),
        verify_links: Some(true),
        link_timeout_secs: Some(9),
        log_file: Some(PathBuf::from("/tmp/topicstream.log")),
    };
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");
    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);

    let mut config = loaded;
    config.base_url = None;
    config.verify_links = None;
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");
    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded.base_url, None);
    assert_eq!(loaded.verify_links, None);
    assert_eq!(loaded.link_timeout_secs, Some(9));
}

#[test]
fn test_invalid_toml_reports_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "base_url = [unclosed").expect("write config");

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), Some(config_path.as_path()));
    assert!(err.to_string().starts_with("could not parse config at"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_unreadable_config_is_a_read_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    // A directory where the file should be cannot be read as text.
    let err = Config::load_from_path(temp_dir.path()).expect_err("read should fail");
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().starts_with("could not read config at"));
}

#[test]
fn test_save_into_a_file_path_is_a_write_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").expect("write blocker");

    let err = Config::default()
        .save_to_path(&blocker.join("config.toml"))
        .expect_err("save should fail");
    assert!(matches!(err, ConfigError::Write { .. }));
    assert!(err.to_string().starts_with("could not write config at"));
}

#[test]
fn test_base_url_resolution_order() {
    assert_eq!(
        Config::pick_base_url(Some("http://flag"), Some("http://env"), Some("http://file")),
        "http://flag"
    );
    assert_eq!(
        Config::pick_base_url(None, Some("http://env"), Some("http://file")),
        "http://env"
    );
    assert_eq!(
        Config::pick_base_url(None, Some("  "), Some("http://file")),
        "http://file"
    );
    assert_eq!(Config::pick_base_url(None, None, None), DEFAULT_BASE_URL);
}

#[test]
fn test_link_timeout_defaults() {
    let config = Config::default();
    assert_eq!(config.link_timeout(), Duration::from_secs(5));
    assert!(!config.verify_links_enabled());

    let zero = Config {
        link_timeout_secs: Some(0),
        ..Default::default()
    };
    assert_eq!(zero.link_timeout(), Duration::from_secs(5));

    let custom = Config {
        link_timeout_secs: Some(12),
        verify_links: Some(true),
        ..Default::default()
    };
    assert_eq!(custom.link_timeout(), Duration::from_secs(12));
    assert!(custom.verify_links_enabled());
}
