//! Tests for configuration loading and root folder resolution
//!
//! Tests that manipulate SKUMAP_ROOT_FOLDER are marked with #[serial] so
//! they never race each other.

use serial_test::serial;
use skumap_common::config::{resolve_root_folder, ConfigSource, TomlConfig, ROOT_FOLDER_ENV};
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_argument_has_highest_priority() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };

    let root = resolve_root_folder(Some(Path::new("/from/cli")), ROOT_FOLDER_ENV, &config);
    assert_eq!(root, PathBuf::from("/from/cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_var_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };

    assert_eq!(resolve_root_folder(None, ROOT_FOLDER_ENV, &config), PathBuf::from("/from/env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_toml_used_without_env() {
    env::remove_var(ROOT_FOLDER_ENV);
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };

    assert_eq!(resolve_root_folder(None, ROOT_FOLDER_ENV, &config), PathBuf::from("/from/toml"));
}

#[test]
#[serial]
fn test_compiled_default_as_fallback() {
    env::remove_var(ROOT_FOLDER_ENV);
    let root = resolve_root_folder(None, ROOT_FOLDER_ENV, &TomlConfig::default());
    assert!(!root.as_os_str().is_empty());
}

#[test]
fn test_load_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        "root_folder = \"/srv/skumap\"\npos_skip_rows = 3\n[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();

    let (config, source) = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(source, ConfigSource::File(path.clone()));
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/skumap")));
    assert_eq!(config.pos_skip_rows, 3);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.port, 5790);
}

#[test]
fn test_load_missing_explicit_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = TomlConfig::load(Some(&temp_dir.path().join("absent.toml")));
    assert!(result.is_err());
}
