//! Build settings
//!
//! Resolves each tunable from, in order: command line, environment, TOML
//! file, compiled default.

use narrator_common::config::{env_override, ToolsConfig, TomlConfig};
use narrator_common::Result;
use std::path::PathBuf;

/// Shared recordings directory
pub const COMMON_DIR_ENV_VAR: &str = "NARRATOR_COMMON_DIR";

/// Concurrent clip renders
pub const JOBS_ENV_VAR: &str = "NARRATOR_JOBS";

/// Per-tool timeout in seconds
pub const TOOL_TIMEOUT_ENV_VAR: &str = "NARRATOR_TOOL_TIMEOUT_SECS";

/// Values given on the command line; `None` defers to lower tiers
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub common_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub voice: Option<String>,
    pub no_synthesis: bool,
}

/// Fully resolved settings for one build
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub tools: ToolsConfig,
    pub resample_rate: u32,
    pub common_dir: Option<PathBuf>,
    pub jobs: usize,
    /// Synthesis voice; `None` when synthesis is disabled
    pub voice: Option<String>,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl BuildSettings {
    /// Resolve settings for a build of `language`
    ///
    /// The synthesis voice defaults to the language code.
    pub fn resolve(cli: CliOverrides, toml: TomlConfig, language: &str) -> Result<Self> {
        let common_dir = match cli.common_dir {
            Some(dir) => Some(dir),
            None => env_override::<PathBuf>(COMMON_DIR_ENV_VAR)?.or(toml.audio.common_dir),
        };

        let jobs = match cli.jobs {
            Some(jobs) => jobs,
            None => env_override::<usize>(JOBS_ENV_VAR)?.unwrap_or(toml.build.jobs),
        }
        .max(1);

        let mut tools = toml.tools;
        if let Some(secs) = env_override::<u64>(TOOL_TIMEOUT_ENV_VAR)? {
            tools.timeout_secs = secs;
        }

        let voice = if cli.no_synthesis {
            None
        } else {
            Some(cli.voice.unwrap_or_else(|| language.to_string()))
        };

        Ok(Self {
            tools,
            resample_rate: toml.audio.resample_rate,
            common_dir,
            jobs,
            voice,
            log_level: toml.logging.level,
        })
    }
}
