//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! This module owns tiers 2 and 3; callers apply the command line on top.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "NARRATOR_CONFIG";

/// Bootstrap configuration loaded from TOML file
///
/// Every section is optional; a missing file yields `TomlConfig::default()`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// External audio tool binaries
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_espeak")]
    pub espeak: String,

    #[serde(default = "default_sox")]
    pub sox: String,

    #[serde(default = "default_oggenc")]
    pub oggenc: String,

    #[serde(default = "default_ogginfo")]
    pub ogginfo: String,

    /// Per-invocation timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            espeak: default_espeak(),
            sox: default_sox(),
            oggenc: default_oggenc(),
            ogginfo: default_ogginfo(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Audio rendering settings
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Sample rate passed to the encoder
    #[serde(default = "default_resample_rate")]
    pub resample_rate: u32,

    /// Shared, read-only directory of common recordings
    #[serde(default)]
    pub common_dir: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            resample_rate: default_resample_rate(),
            common_dir: None,
        }
    }
}

/// Build execution settings
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Number of clips rendered concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self { jobs: default_jobs() }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_espeak() -> String {
    "espeak".to_string()
}

fn default_sox() -> String {
    "sox".to_string()
}

fn default_oggenc() -> String {
    "oggenc".to_string()
}

fn default_ogginfo() -> String {
    "ogginfo".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_resample_rate() -> u32 {
    44100
}

fn default_jobs() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from an explicit file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration, discovering the file when none is given
    ///
    /// An explicit path (argument or `NARRATOR_CONFIG`) must exist. A
    /// discovered path is optional: no file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }

        match find_config_file() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Locate the default configuration file for the platform
///
/// Tries `<user config dir>/narrator/build.toml`, then (Linux only)
/// `/etc/narrator/build.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("narrator").join("build.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/narrator/build.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Read a typed override from the environment
///
/// Unset is `Ok(None)`; set but unparseable is a configuration error.
pub fn env_override<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}
