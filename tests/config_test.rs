//! Integration tests for Settings config loading with layered precedence.
//!
//! Precedence: defaults < global TOML file < `INTERNHUB_*` env vars.
//!
//! Only `given_env_var_..._then_env_wins` touches the environment, and it
//! only sets `min_password_len`, which no other test in this file asserts.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use internhub::config::{global_config_path, Settings};

#[test]
fn given_missing_file_when_loading_then_defaults_apply() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("internhub.toml");

    // Act
    let settings = Settings::load_from(Some(&missing)).expect("load settings");

    // Assert
    assert!(settings.seed_demo_data);
    assert_eq!(settings.top_companies, 5);
    assert_eq!(settings.suggestion_limit, 5);
}

#[test]
fn given_partial_file_when_loading_then_unset_fields_keep_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("internhub.toml");
    fs::write(&path, "top_companies = 3\nseed_demo_data = false\n").unwrap();

    // Act
    let settings = Settings::load_from(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.top_companies, 3);
    assert!(!settings.seed_demo_data);
    assert_eq!(settings.suggestion_limit, 5);
}

#[test]
fn given_export_dir_with_tilde_when_loading_then_it_is_expanded() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("internhub.toml");
    fs::write(&path, "export_dir = \"~/internhub-exports\"\n").unwrap();

    // Act
    let settings = Settings::load_from(Some(&path)).expect("load settings");

    // Assert
    let home = PathBuf::from(std::env::var("HOME").expect("HOME should be set"));
    assert_eq!(settings.export_dir, home.join("internhub-exports"));
}

#[test]
fn given_malformed_file_when_loading_then_returns_config_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("internhub.toml");
    fs::write(&path, "top_companies = \"many\"\n").unwrap();

    // Act
    let result = Settings::load_from(Some(&path));

    // Assert
    let err = result.expect_err("malformed config must fail");
    assert!(err.to_string().contains("config error"));
}

#[test]
fn given_env_var_and_file_value_when_loading_then_env_wins() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("internhub.toml");
    fs::write(&path, "min_password_len = 10\n").unwrap();
    std::env::set_var("INTERNHUB_MIN_PASSWORD_LEN", "12");

    // Act
    let settings = Settings::load_from(Some(&path));
    std::env::remove_var("INTERNHUB_MIN_PASSWORD_LEN");

    // Assert
    assert_eq!(settings.expect("load settings").min_password_len, 12);
}

#[test]
fn given_file_value_without_env_when_loading_then_file_beats_default() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("internhub.toml");
    fs::write(&path, "suggestion_limit = 9\n").unwrap();

    // Act
    let settings = Settings::load_from(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.suggestion_limit, 9);
}

#[test]
fn given_template_when_written_and_loaded_then_yields_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("internhub.toml");
    fs::write(&path, Settings::template()).unwrap();

    // Act
    let settings = Settings::load_from(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.top_companies, Settings::default().top_companies);
    assert_eq!(settings.suggestion_limit, Settings::default().suggestion_limit);
}

#[test]
fn given_home_directory_when_resolving_global_path_then_ends_with_internhub_toml() {
    let path = global_config_path().expect("home directory available");
    assert!(path.ends_with("internhub/internhub.toml"));
}
