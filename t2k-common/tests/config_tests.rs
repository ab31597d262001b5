//! Unit tests for configuration and dataset path resolution
//!
//! Tests the implementation of:
//! - Priority order: CLI argument, environment, TOML, compiled default
//! - Missing or malformed TOML files falling back to defaults
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate T2K_DATASET_PATH are marked with #[serial].

use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use t2k_common::config::{
    resolve_dataset_path, LoggingConfig, TomlConfig, DATASET_ENV_VAR, DEFAULT_DATASET_PATH,
};
use t2k_common::Error;
use tempfile::TempDir;

fn toml_with_dataset(path: &str) -> TomlConfig {
    TomlConfig {
        dataset_path: Some(PathBuf::from(path)),
        logging: LoggingConfig::default(),
    }
}

#[test]
#[serial]
fn test_no_overrides_uses_compiled_default() {
    env::remove_var(DATASET_ENV_VAR);

    let path = resolve_dataset_path(None, &TomlConfig::default());
    assert_eq!(path, PathBuf::from(DEFAULT_DATASET_PATH));
}

#[test]
#[serial]
fn test_toml_used_without_env() {
    env::remove_var(DATASET_ENV_VAR);

    let path = resolve_dataset_path(None, &toml_with_dataset("/srv/t2k/songs.json"));
    assert_eq!(path, PathBuf::from("/srv/t2k/songs.json"));
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(DATASET_ENV_VAR, "/tmp/t2k-env/songs.json");

    let path = resolve_dataset_path(None, &toml_with_dataset("/srv/t2k/songs.json"));
    assert_eq!(path, PathBuf::from("/tmp/t2k-env/songs.json"));

    env::remove_var(DATASET_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_is_ignored() {
    env::set_var(DATASET_ENV_VAR, "  ");

    let path = resolve_dataset_path(None, &toml_with_dataset("/srv/t2k/songs.json"));
    assert_eq!(path, PathBuf::from("/srv/t2k/songs.json"));

    env::remove_var(DATASET_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_beats_env() {
    env::set_var(DATASET_ENV_VAR, "/tmp/t2k-env/songs.json");

    let path = resolve_dataset_path(Some(Path::new("./cli.json")), &TomlConfig::default());
    assert_eq!(path, PathBuf::from("./cli.json"));

    env::remove_var(DATASET_ENV_VAR);
}

#[test]
fn test_load_reads_toml_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(
        &file,
        "dataset_path = \"/data/songs.json\"\n\n[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();

    let config = TomlConfig::load(&file).unwrap();
    assert_eq!(config.dataset_path, Some(PathBuf::from("/data/songs.json")));
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.file.is_none());
}

#[test]
fn test_load_malformed_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, "dataset_path = [unterminated").unwrap();

    assert!(matches!(TomlConfig::load(&file), Err(Error::Config(_))));
}

#[test]
fn test_load_or_default_survives_bad_files() {
    let dir = TempDir::new().unwrap();

    let missing = TomlConfig::load_or_default(Some(&dir.path().join("absent.toml")));
    assert!(missing.dataset_path.is_none());
    assert_eq!(missing.logging.level, "info");

    let file = dir.path().join("config.toml");
    std::fs::write(&file, "logging = 42").unwrap();
    let malformed = TomlConfig::load_or_default(Some(&file));
    assert!(malformed.dataset_path.is_none());
}
