//! narrator-build - narration database builder
//!
//! Reads prompt, message and translation catalogs, renders one Ogg Vorbis
//! clip per literal segment and writes the narration database for one
//! language. With `--unarrator` it writes low-fidelity waveforms instead.

use anyhow::{bail, Context, Result};
use clap::Parser;
use narrator_build::catalog::{self, CatalogSources};
use narrator_build::config::{BuildSettings, CliOverrides};
use narrator_build::pipeline::{self, RenderOptions};
use narrator_build::services::{ArtifactBuilder, AudioDirs, ProcessToolchain};
use narrator_common::config::TomlConfig;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for narrator-build
#[derive(Parser, Debug)]
#[command(name = "narrator-build")]
#[command(about = "Build a localized narration database")]
#[command(version)]
struct Cli {
    /// Catalog listing the prompts to include in the build
    #[arg(short, long)]
    prompts: PathBuf,

    /// Catalog listing message classes and identifiers
    #[arg(short, long)]
    messages: PathBuf,

    /// Catalog listing prompt translations
    #[arg(short, long)]
    translation: PathBuf,

    /// Two letter code of the language to build (ISO-639)
    #[arg(short, long = "language-code")]
    language_code: String,

    /// Output database file
    #[arg(short, long)]
    output: PathBuf,

    /// Append prompts to an existing database
    #[arg(short, long)]
    append: bool,

    /// Use and keep narrator audio in this directory (default: temporary)
    #[arg(short, long)]
    indir: Option<PathBuf>,

    /// Create resampled prompts for unarrator instead of a database
    #[arg(short, long, requires = "indir")]
    unarrator: bool,

    /// Directory with the default narrator catalogs
    #[arg(long, env = "NARRATOR_DATA_DIR")]
    narrator_data: Option<PathBuf>,

    /// Shared directory of common recordings
    #[arg(long)]
    common_dir: Option<PathBuf>,

    /// Synthesis voice for missing recordings (default: the language code)
    #[arg(long, conflicts_with = "no_synthesis")]
    voice: Option<String>,

    /// Never synthesize missing recordings
    #[arg(long)]
    no_synthesis: bool,

    /// Number of clips rendered concurrently
    #[arg(long)]
    jobs: Option<usize>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let toml_config = TomlConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let overrides = CliOverrides {
        common_dir: cli.common_dir.clone(),
        jobs: cli.jobs,
        voice: cli.voice.clone(),
        no_synthesis: cli.no_synthesis,
    };
    let settings = BuildSettings::resolve(overrides, toml_config, &cli.language_code)?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting narrator-build v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toolchain = ProcessToolchain::new(settings.tools.clone(), settings.resample_rate);
    let missing = toolchain.verify().await;
    if !missing.is_empty() {
        for tool in &missing {
            error!(
                "{} command not found on system, make sure that package '{}' is installed",
                tool.program, tool.package
            );
        }
        bail!("{} required tool(s) missing", missing.len());
    }

    if let Some(indir) = &cli.indir {
        if !indir.is_dir() {
            bail!("directory {} does not exist", indir.display());
        }
    }

    let defaults = cli
        .narrator_data
        .as_deref()
        .map(|dir| CatalogSources::defaults(dir, &cli.language_code))
        .unwrap_or_default();
    let user = CatalogSources::user(cli.prompts.clone(), cli.messages.clone(), cli.translation.clone());
    let catalog = catalog::load(&defaults, &user)?;
    let mut messages = catalog.assemble(&cli.language_code)?;
    info!(messages = messages.len(), language = %cli.language_code, "Catalogs loaded");

    // The temporary directory is removed when `_scratch` drops
    let (work_dir, _scratch) = match &cli.indir {
        Some(indir) => (indir.clone(), None),
        None => {
            let dir = tempfile::TempDir::new().context("Failed to create temporary directory")?;
            (dir.path().to_path_buf(), Some(dir))
        }
    };
    info!(path = %work_dir.display(), "Working directory");

    let builder = ArtifactBuilder::new(
        toolchain,
        AudioDirs {
            work_dir: work_dir.clone(),
            common_dir: settings.common_dir.clone(),
        },
    );
    let options = RenderOptions {
        voice: settings.voice.clone(),
        jobs: settings.jobs,
    };

    if cli.unarrator {
        let destination = work_dir.join("unarrator").join(&cli.language_code);
        let report = pipeline::resample_messages(&builder, &messages, &destination, &options).await?;
        if !report.is_success() {
            for failure in &report.failures {
                error!("{}: {}", failure.message_key, failure.error);
            }
            bail!("{} prompt(s) could not be resampled", report.failures.len());
        }
        return Ok(());
    }

    let report = pipeline::render_messages(&builder, &mut messages, &options).await;
    if !report.is_success() {
        for failure in &report.failures {
            error!(
                "{} (in message(s) {})",
                failure.error,
                failure.message_keys.join(", ")
            );
        }
        bail!("{} audio clip(s) could not be created", report.failures.len());
    }

    pipeline::validate_messages(&messages)?;

    if !cli.append && cli.output.exists() {
        info!(path = %cli.output.display(), "Removing existing output");
        std::fs::remove_file(&cli.output)
            .with_context(|| format!("Failed to remove {}", cli.output.display()))?;
    }

    let pool = narrator_common::db::init_database(&cli.output).await?;
    narrator_build::db::persist_all(&pool, &messages).await?;
    pool.close().await;

    info!(path = %cli.output.display(), "Narration database ready");
    Ok(())
}
