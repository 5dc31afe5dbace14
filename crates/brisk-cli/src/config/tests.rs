#![cfg(test)]

use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use crate::config::*;
use crate::error::{CliError, ConfigError};

fn load(cwd: &Path, overrides: ConfigOverrides) -> crate::Result<BriskConfig> {
    BriskConfig::load(cwd, &overrides)
}

#[test]
#[serial]
fn test_defaults() {
    let temp = TempDir::new().unwrap();
    let config = load(temp.path(), ConfigOverrides::default()).unwrap();

    assert_eq!(config.root, temp.path());
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 3000);
    assert_eq!(config.cache_dir, PathBuf::from("node_modules/.brisk"));
    assert_eq!(config.index_html, PathBuf::from("index.html"));
    assert_eq!(config.mode, "development");
    config.validate().unwrap();
}

#[test]
#[serial]
fn test_file_then_env_then_cli() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join(CONFIG_FILE),
        r#"{ "port": 4000, "host": "0.0.0.0", "cacheDir": ".cache/deps", "mode": "staging" }"#,
    )
    .unwrap();

    let config = load(temp.path(), ConfigOverrides::default()).unwrap();
    assert_eq!(config.port, 4000);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.cache_dir, PathBuf::from(".cache/deps"));

    unsafe {
        std::env::set_var("BRISK_PORT", "5000");
    }
    let from_env = load(temp.path(), ConfigOverrides::default());
    let from_cli = load(
        temp.path(),
        ConfigOverrides {
            port: Some(6000),
            ..ConfigOverrides::default()
        },
    );
    unsafe {
        std::env::remove_var("BRISK_PORT");
    }

    assert_eq!(from_env.unwrap().port, 5000);
    let from_cli = from_cli.unwrap();
    assert_eq!(from_cli.port, 6000);
    assert_eq!(from_cli.mode, "staging");
}

#[test]
#[serial]
fn test_unrelated_env_vars_are_ignored() {
    let temp = TempDir::new().unwrap();

    unsafe {
        std::env::set_var("BRISK_LOG", "debug");
        std::env::set_var("BRISK_CACHE_DIR", ".cache/env-deps");
    }
    let config = load(temp.path(), ConfigOverrides::default());
    unsafe {
        std::env::remove_var("BRISK_LOG");
        std::env::remove_var("BRISK_CACHE_DIR");
    }

    let config = config.unwrap();
    assert_eq!(config.cache_dir, PathBuf::from(".cache/env-deps"));
    assert_eq!(config.port, default_port());
}

#[test]
#[serial]
fn test_root_override_selects_config_file() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    std::fs::create_dir(&app).unwrap();
    std::fs::write(app.join(CONFIG_FILE), r#"{ "indexHtml": "public/index.html" }"#).unwrap();

    let config = load(
        temp.path(),
        ConfigOverrides {
            root: Some(PathBuf::from("app")),
            ..ConfigOverrides::default()
        },
    )
    .unwrap();

    assert_eq!(config.root, app);
    assert_eq!(config.index_html_path(), app.join("public/index.html"));
}

#[test]
#[serial]
fn test_explicit_config_must_exist() {
    let temp = TempDir::new().unwrap();
    let err = load(
        temp.path(),
        ConfigOverrides {
            config: Some(PathBuf::from("missing.json")),
            ..ConfigOverrides::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, CliError::Config(ConfigError::NotFound(_))));
}

#[test]
#[serial]
fn test_invalid_field_type() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(CONFIG_FILE), r#"{ "port": "not a port" }"#).unwrap();

    let err = load(temp.path(), ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, CliError::Config(ConfigError::InvalidValue { .. })));
}

#[test]
fn test_validate_rejects_port_zero() {
    let temp = TempDir::new().unwrap();
    let config = BriskConfig {
        root: temp.path().to_path_buf(),
        port: 0,
        ..BriskConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_missing_root() {
    let temp = TempDir::new().unwrap();
    let config = BriskConfig {
        root: temp.path().join("nope"),
        ..BriskConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_cache_outside_root() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("app");
    std::fs::create_dir(&root).unwrap();

    for cache_dir in [temp.path().join("cache"), PathBuf::from("../cache")] {
        let config = BriskConfig {
            root: root.clone(),
            cache_dir,
            ..BriskConfig::default()
        };
        assert!(config.validate().is_err());
    }

    let inside = BriskConfig {
        root: root.clone(),
        cache_dir: root.join(".cache"),
        ..BriskConfig::default()
    };
    inside.validate().unwrap();
}

#[test]
fn test_socket_addr() {
    let config = BriskConfig {
        host: "localhost".to_string(),
        port: 8080,
        ..BriskConfig::default()
    };
    assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");

    let config = BriskConfig {
        host: "example.com".to_string(),
        ..BriskConfig::default()
    };
    assert!(config.socket_addr().is_err());
}

#[test]
fn test_serialization_is_camel_case() {
    let json = serde_json::to_value(BriskConfig::default()).unwrap();
    assert!(json.get("cacheDir").is_some());
    assert!(json.get("indexHtml").is_some());
    assert!(json.get("cache_dir").is_none());
}
