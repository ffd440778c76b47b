//! Audio artifact builder
//!
//! Turns one literal segment into a validated Ogg Vorbis clip:
//!
//! 1. **Locate**: resolve the waveform/compressed paths in the working
//!    directory, falling back to the shared common recordings directory
//! 2. **Synthesize** (optional): create a missing waveform with the
//!    synthesis voice
//! 3. **Encode**: trim + pad + compress when the compressed file is absent
//!    or older than its waveform (cache hit otherwise)
//! 4. **Inspect**: size from the filesystem, playback length from ogginfo
//! 5. **Digest**: read the payload and compute its MD5
//!
//! Any stage failure ends the clip with an `ArtifactError`; nothing here
//! aborts sibling clips.

use crate::error::{ArtifactError, Stage};
use crate::services::duration::parse_playback_length;
use crate::services::filenames::clip_file_name;
use crate::services::toolchain::{AudioToolchain, ToolError};
use md5::{Digest, Md5};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Directories searched for recordings
#[derive(Debug, Clone)]
pub struct AudioDirs {
    /// Working directory: waveforms and artifacts are read and written here
    pub work_dir: PathBuf,
    /// Shared recordings, read-only
    pub common_dir: Option<PathBuf>,
}

/// Resolved file locations for one clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSource {
    pub wav: PathBuf,
    pub ogg: PathBuf,
    /// Waveform resolved to the common recordings directory
    pub wav_shared: bool,
    /// Compressed file resolved to the common recordings directory
    pub ogg_shared: bool,
}

/// What the encode stage did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOutcome {
    /// No artifact existed; encoded
    Encoded,
    /// Artifact was older than its waveform; removed and encoded again
    Reencoded,
    /// Artifact up to date; encoding skipped
    CacheHit,
    /// Pre-rendered artifact from the common recordings directory
    Shared,
}

/// Result of a successful render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAudio {
    pub ogg_path: PathBuf,
    pub size_bytes: u64,
    pub length_ms: u64,
    pub data: Vec<u8>,
    /// Lower-case hex MD5 of `data`
    pub md5: String,
    pub outcome: EncodeOutcome,
}

/// What the resample operation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleOutcome {
    Written,
    AlreadyPresent,
}

/// Artifact builder over an audio toolchain
pub struct ArtifactBuilder<T> {
    toolchain: T,
    dirs: AudioDirs,
}

impl<T: AudioToolchain> ArtifactBuilder<T> {
    pub fn new(toolchain: T, dirs: AudioDirs) -> Self {
        Self { toolchain, dirs }
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Resolve waveform and artifact paths for a clip
    ///
    /// The common directory is consulted only when the working waveform is
    /// absent; each of its files replaces the working path independently.
    pub async fn locate(&self, text: &str, basename: Option<&str>) -> LocatedSource {
        let wav_name = clip_file_name(text, basename, "wav");
        let ogg_name = clip_file_name(text, basename, "ogg");

        let mut located = LocatedSource {
            wav: self.dirs.work_dir.join(&wav_name),
            ogg: self.dirs.work_dir.join(&ogg_name),
            wav_shared: false,
            ogg_shared: false,
        };

        if exists(&located.wav).await {
            return located;
        }

        if let Some(common) = &self.dirs.common_dir {
            let shared_wav = common.join(&wav_name);
            let shared_ogg = common.join(&ogg_name);
            if exists(&shared_wav).await {
                debug!(path = %shared_wav.display(), "Using common waveform");
                located.wav = shared_wav;
                located.wav_shared = true;
            }
            if exists(&shared_ogg).await {
                debug!(path = %shared_ogg.display(), "Using common artifact");
                located.ogg = shared_ogg;
                located.ogg_shared = true;
            }
        }

        located
    }

    /// Make sure the located waveform exists, synthesizing it if possible
    ///
    /// Without a voice a missing waveform fails before any process runs.
    async fn ensure_waveform(
        &self,
        located: &LocatedSource,
        text: &str,
        voice: Option<&str>,
    ) -> Result<(), ArtifactError> {
        if exists(&located.wav).await {
            return Ok(());
        }

        let Some(voice) = voice else {
            return Err(ArtifactError::MissingSource {
                path: located.wav.clone(),
            });
        };

        info!(path = %located.wav.display(), voice, "wav file not found, generating audio");
        self.toolchain
            .synthesize(voice, text, &located.wav)
            .await
            .map_err(|e| tool_failure(Stage::Synthesize, &located.wav, e))?;

        if !exists(&located.wav).await {
            return Err(ArtifactError::Encode {
                stage: Stage::Synthesize,
                path: located.wav.clone(),
                command: format!("synthesize -v {}", voice),
                reason: "no waveform written".to_string(),
            });
        }
        Ok(())
    }

    /// Render one literal segment into a ready artifact
    pub async fn render(
        &self,
        text: &str,
        basename: Option<&str>,
        voice: Option<&str>,
    ) -> Result<RenderedAudio, ArtifactError> {
        let located = self.locate(text, basename).await;

        let outcome = if located.ogg_shared {
            debug!(path = %located.ogg.display(), "Shared artifact, skipping encode");
            EncodeOutcome::Shared
        } else {
            self.ensure_waveform(&located, text, voice).await?;
            self.encode_if_stale(&located.wav, &located.ogg).await?
        };

        self.inspect(&located.ogg, outcome).await
    }

    /// Run trim + encode unless the artifact is present and fresh
    pub async fn encode_if_stale(&self, wav: &Path, ogg: &Path) -> Result<EncodeOutcome, ArtifactError> {
        if !exists(ogg).await {
            info!(path = %ogg.display(), "ogg file does not exist, encoding wav to ogg");
            self.trim_and_encode(wav, ogg).await?;
            return Ok(EncodeOutcome::Encoded);
        }

        let wav_modified = modified(wav).await?;
        let ogg_modified = modified(ogg).await?;
        if wav_modified > ogg_modified {
            info!(path = %wav.display(), "wav file is updated, re-encoding wav to ogg");
            tokio::fs::remove_file(ogg)
                .await
                .map_err(|e| ArtifactError::io(ogg, e))?;
            self.trim_and_encode(wav, ogg).await?;
            return Ok(EncodeOutcome::Reencoded);
        }

        debug!(path = %ogg.display(), "ogg file up to date");
        Ok(EncodeOutcome::CacheHit)
    }

    async fn trim_and_encode(&self, wav: &Path, ogg: &Path) -> Result<(), ArtifactError> {
        let trimmed = self.trimmed_path(ogg);

        let result = async {
            self.toolchain
                .trim_and_pad(wav, &trimmed)
                .await
                .map_err(|e| tool_failure(Stage::Trim, wav, e))?;
            self.toolchain
                .encode(&trimmed, ogg)
                .await
                .map_err(|e| tool_failure(Stage::Encode, wav, e))
        }
        .await;

        if let Err(e) = tokio::fs::remove_file(&trimmed).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(path = %trimmed.display(), error = %e, "Could not remove trimmed file");
            }
        }

        result
    }

    /// Scratch file for the trimmed waveform, unique per artifact
    fn trimmed_path(&self, ogg: &Path) -> PathBuf {
        let stem = ogg
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip".to_string());
        self.dirs.work_dir.join(format!("{}.trimmed.wav", stem))
    }

    async fn inspect(&self, ogg: &Path, outcome: EncodeOutcome) -> Result<RenderedAudio, ArtifactError> {
        if !exists(ogg).await {
            return Err(ArtifactError::MissingOutput {
                path: ogg.to_path_buf(),
            });
        }

        let size_bytes = tokio::fs::metadata(ogg)
            .await
            .map_err(|e| ArtifactError::io(ogg, e))?
            .len();

        let report = self
            .toolchain
            .inspect(ogg)
            .await
            .map_err(|e| tool_failure(Stage::Inspect, ogg, e))?;
        let length_ms = parse_playback_length(&report).map_err(|e| ArtifactError::DurationParse {
            path: ogg.to_path_buf(),
            reason: e.to_string(),
        })?;

        let data = tokio::fs::read(ogg)
            .await
            .map_err(|e| ArtifactError::io(ogg, e))?;
        let md5 = format!("{:x}", Md5::digest(&data));

        debug!(
            path = %ogg.display(),
            size_bytes,
            length_ms,
            md5 = %md5,
            "Artifact ready"
        );

        Ok(RenderedAudio {
            ogg_path: ogg.to_path_buf(),
            size_bytes,
            length_ms,
            data,
            md5,
            outcome,
        })
    }

    /// Write a mono 8-bit/8 kHz copy of the clip's waveform to `target`
    ///
    /// Shares waveform resolution and synthesis with `render`, skips every
    /// encode stage, and never overwrites an existing target.
    pub async fn resample(
        &self,
        text: &str,
        basename: Option<&str>,
        target: &Path,
        voice: Option<&str>,
    ) -> Result<ResampleOutcome, ArtifactError> {
        let located = self.locate(text, basename).await;
        self.ensure_waveform(&located, text, voice).await?;

        if exists(target).await {
            debug!(path = %target.display(), "Resampled wav already present");
            return Ok(ResampleOutcome::AlreadyPresent);
        }

        info!(
            path = %target.display(),
            source = %located.wav.display(),
            "wav file does not exist, resampling"
        );
        self.toolchain
            .resample(&located.wav, target)
            .await
            .map_err(|e| tool_failure(Stage::Resample, &located.wav, e))?;
        Ok(ResampleOutcome::Written)
    }
}

fn tool_failure(stage: Stage, path: &Path, error: ToolError) -> ArtifactError {
    ArtifactError::Encode {
        stage,
        path: path.to_path_buf(),
        command: error.command().to_string(),
        reason: error.to_string(),
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn modified(path: &Path) -> Result<SystemTime, ArtifactError> {
    tokio::fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .map_err(|e| ArtifactError::io(path, e))
}
