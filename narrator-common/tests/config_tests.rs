//! Unit tests for bootstrap configuration loading
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate NARRATOR_CONFIG or override variables are marked
//! with #[serial].

use narrator_common::config::{env_override, TomlConfig, CONFIG_ENV_VAR};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_defaults_when_sections_missing() {
    let config = TomlConfig::from_toml_str("").unwrap();

    assert_eq!(config.tools.espeak, "espeak");
    assert_eq!(config.tools.sox, "sox");
    assert_eq!(config.tools.oggenc, "oggenc");
    assert_eq!(config.tools.ogginfo, "ogginfo");
    assert_eq!(config.tools.timeout_secs, 120);
    assert_eq!(config.audio.resample_rate, 44100);
    assert!(config.audio.common_dir.is_none());
    assert_eq!(config.build.jobs, 1);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_partial_sections_keep_field_defaults() {
    let config = TomlConfig::from_toml_str(
        r#"
        [tools]
        espeak = "/usr/local/bin/espeak-ng"
        timeout_secs = 30

        [audio]
        common_dir = "/usr/share/narrator/special"
        "#,
    )
    .unwrap();

    assert_eq!(config.tools.espeak, "/usr/local/bin/espeak-ng");
    assert_eq!(config.tools.timeout_secs, 30);
    // Untouched fields in a present section still default
    assert_eq!(config.tools.sox, "sox");
    assert_eq!(config.audio.resample_rate, 44100);
    assert_eq!(
        config.audio.common_dir,
        Some(PathBuf::from("/usr/share/narrator/special"))
    );
}

#[test]
fn test_malformed_toml_is_config_error() {
    let result = TomlConfig::from_toml_str("[tools\nespeak = ");
    assert!(matches!(result, Err(narrator_common::Error::Config(_))));
}

#[test]
#[serial]
fn test_explicit_file_takes_priority_over_env() {
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("explicit.toml");
    let from_env = dir.path().join("env.toml");
    std::fs::write(&explicit, "[build]\njobs = 3\n").unwrap();
    std::fs::write(&from_env, "[build]\njobs = 7\n").unwrap();

    env::set_var(CONFIG_ENV_VAR, &from_env);
    let config = TomlConfig::load(Some(&explicit)).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.build.jobs, 3);
}

#[test]
#[serial]
fn test_env_config_file_used_without_explicit_path() {
    let dir = TempDir::new().unwrap();
    let from_env = dir.path().join("env.toml");
    std::fs::write(&from_env, "[logging]\nlevel = \"debug\"\n").unwrap();

    env::set_var(CONFIG_ENV_VAR, &from_env);
    let config = TomlConfig::load(None).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_missing_explicit_file_is_error() {
    let dir = TempDir::new().unwrap();
    let result = TomlConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_env_override_parsing() {
    env::remove_var("NARRATOR_TEST_JOBS");
    assert_eq!(env_override::<usize>("NARRATOR_TEST_JOBS").unwrap(), None);

    env::set_var("NARRATOR_TEST_JOBS", " 4 ");
    assert_eq!(env_override::<usize>("NARRATOR_TEST_JOBS").unwrap(), Some(4));

    env::set_var("NARRATOR_TEST_JOBS", "four");
    assert!(env_override::<usize>("NARRATOR_TEST_JOBS").is_err());

    env::remove_var("NARRATOR_TEST_JOBS");
}
