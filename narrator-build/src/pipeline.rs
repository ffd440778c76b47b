//! Build pipeline
//!
//! Renders every clip of every message, collecting per-clip failures
//! instead of stopping at the first one. Clips that resolve to the same
//! artifact file are rendered once and the result is shared.

use crate::error::{ArtifactError, BuildError, BuildResult};
use crate::models::Message;
use crate::services::filenames::clip_file_name;
use crate::services::{ArtifactBuilder, AudioToolchain, EncodeOutcome, RenderedAudio, ResampleOutcome};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Rendering options shared by every clip
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Synthesis voice for missing waveforms; `None` disables synthesis
    pub voice: Option<String>,
    /// Clips rendered concurrently
    pub jobs: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { voice: None, jobs: 1 }
    }
}

/// An artifact that could not be rendered
#[derive(Debug)]
pub struct ClipFailure {
    /// Clip text
    pub text: String,
    /// Keys of every message containing the clip
    pub message_keys: Vec<String>,
    pub error: ArtifactError,
}

/// Outcome of rendering a message set, counted per distinct artifact
#[derive(Debug, Default)]
pub struct RenderReport {
    pub encoded: usize,
    pub reencoded: usize,
    pub cache_hits: usize,
    pub shared: usize,
    pub failures: Vec<ClipFailure>,
}

impl RenderReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn count(&mut self, outcome: EncodeOutcome) {
        match outcome {
            EncodeOutcome::Encoded => self.encoded += 1,
            EncodeOutcome::Reencoded => self.reencoded += 1,
            EncodeOutcome::CacheHit => self.cache_hits += 1,
            EncodeOutcome::Shared => self.shared += 1,
        }
    }
}

struct RenderJob {
    text: String,
    basename: Option<String>,
    message_keys: Vec<String>,
}

/// Render every clip and attach the results to the messages
///
/// All clips are attempted; failed clips stay unrendered and are listed in
/// the report.
pub async fn render_messages<T: AudioToolchain>(
    builder: &ArtifactBuilder<T>,
    messages: &mut [Message],
    options: &RenderOptions,
) -> RenderReport {
    let mut jobs: Vec<RenderJob> = Vec::new();
    let mut job_index: HashMap<String, usize> = HashMap::new();

    for message in messages.iter() {
        for clip in &message.translation.clips {
            let name = clip_file_name(&clip.text, clip.basename.as_deref(), "ogg");
            let index = *job_index.entry(name).or_insert_with(|| {
                jobs.push(RenderJob {
                    text: clip.text.clone(),
                    basename: clip.basename.clone(),
                    message_keys: Vec::new(),
                });
                jobs.len() - 1
            });
            if !jobs[index].message_keys.contains(&message.key) {
                jobs[index].message_keys.push(message.key.clone());
            }
        }
    }

    info!(
        messages = messages.len(),
        artifacts = jobs.len(),
        jobs = options.jobs,
        "Rendering audio"
    );

    let voice = options.voice.as_deref();
    let results: Vec<Result<RenderedAudio, ArtifactError>> = stream::iter(
        jobs.iter()
            .map(|job| builder.render(&job.text, job.basename.as_deref(), voice)),
    )
    .buffered(options.jobs.max(1))
    .collect()
    .await;

    let mut report = RenderReport::default();
    let mut ready: Vec<Option<RenderedAudio>> = Vec::with_capacity(jobs.len());
    for (job, result) in jobs.into_iter().zip(results) {
        match result {
            Ok(audio) => {
                report.count(audio.outcome);
                ready.push(Some(audio));
            }
            Err(error) => {
                warn!(text = %job.text, error = %error, "Could not render clip");
                report.failures.push(ClipFailure {
                    text: job.text,
                    message_keys: job.message_keys,
                    error,
                });
                ready.push(None);
            }
        }
    }

    for message in messages.iter_mut() {
        for clip in &mut message.translation.clips {
            let name = clip_file_name(&clip.text, clip.basename.as_deref(), "ogg");
            if let Some(Some(audio)) = job_index.get(&name).map(|&i| &ready[i]) {
                clip.apply(audio);
            }
        }
    }

    info!(
        encoded = report.encoded,
        reencoded = report.reencoded,
        cache_hits = report.cache_hits,
        shared = report.shared,
        failed = report.failures.len(),
        "Rendering finished"
    );

    report
}

/// Validate every assembled message; the first invalid one fails the build
pub fn validate_messages(messages: &[Message]) -> BuildResult<()> {
    for message in messages {
        message.validate()?;
    }
    Ok(())
}

/// A message that could not be resampled
#[derive(Debug)]
pub struct ResampleFailure {
    pub message_key: String,
    pub error: BuildError,
}

/// Outcome of a resample run
#[derive(Debug, Default)]
pub struct ResampleReport {
    pub written: usize,
    pub already_present: usize,
    pub failures: Vec<ResampleFailure>,
}

impl ResampleReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Write one low-fidelity waveform per message into `destination`
///
/// Each target is named after the message key's single literal segment.
/// Messages whose key and translation both have several literal segments
/// are rejected before anything is written.
pub async fn resample_messages<T: AudioToolchain>(
    builder: &ArtifactBuilder<T>,
    messages: &[Message],
    destination: &Path,
    options: &RenderOptions,
) -> BuildResult<ResampleReport> {
    let mut report = ResampleReport::default();
    let mut planned: Vec<(String, &str, Option<&str>, PathBuf)> = Vec::new();

    for message in messages {
        match message.translation.resample_source() {
            Ok((clip, key_text)) => {
                let target = destination.join(clip_file_name(&key_text, None, "wav"));
                if planned.iter().any(|(_, _, _, t)| *t == target) {
                    warn!(key = %message.key, path = %target.display(), "Resample target already planned");
                    continue;
                }
                planned.push((
                    message.key.clone(),
                    clip.text.as_str(),
                    clip.basename.as_deref(),
                    target,
                ));
            }
            Err(error) => {
                warn!(key = %message.key, error = %error, "Cannot resample message");
                report.failures.push(ResampleFailure {
                    message_key: message.key.clone(),
                    error,
                });
            }
        }
    }

    if planned.is_empty() {
        return Ok(report);
    }

    tokio::fs::create_dir_all(destination).await?;

    let voice = options.voice.as_deref();
    let results: Vec<_> = stream::iter(
        planned
            .iter()
            .map(|(_, text, basename, target)| builder.resample(text, *basename, target, voice)),
    )
    .buffered(options.jobs.max(1))
    .collect()
    .await;

    for ((key, ..), result) in planned.into_iter().zip(results) {
        match result {
            Ok(ResampleOutcome::Written) => report.written += 1,
            Ok(ResampleOutcome::AlreadyPresent) => report.already_present += 1,
            Err(error) => {
                warn!(key = %key, error = %error, "Could not resample message");
                report.failures.push(ResampleFailure {
                    message_key: key,
                    error: error.into(),
                });
            }
        }
    }

    info!(
        written = report.written,
        already_present = report.already_present,
        failed = report.failures.len(),
        "Resampling finished"
    );

    Ok(report)
}
