//! Shared test fixtures: a recording fake toolchain and file helpers

#![allow(dead_code)]

use async_trait::async_trait;
use narrator_build::error::Stage;
use narrator_build::models::{Message, Translation};
use narrator_build::services::{ArtifactBuilder, AudioDirs, AudioToolchain, ToolError};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub const DEFAULT_REPORT: &str = "Processing file \"clip.ogg\"...\n\
    New logical stream (#1, serial: 1a2b3c4d): type vorbis\n\
    Vorbis stream 1:\n\
    \tTotal data length: 9876 bytes\n\
    \tPlayback length: 0m:01.250s\n\
    \tAverage bitrate: 63.2 kb/s\n\
    Logical stream 1 ended\n";

/// Toolchain that writes placeholder files and counts every invocation
pub struct FakeToolchain {
    pub synthesize_calls: AtomicUsize,
    pub trim_calls: AtomicUsize,
    pub encode_calls: AtomicUsize,
    pub inspect_calls: AtomicUsize,
    pub resample_calls: AtomicUsize,
    /// Stage that exits non-zero
    pub fail_stage: Option<Stage>,
    /// Encode reports success without writing the artifact
    pub skip_ogg_write: bool,
    /// Inspector output
    pub report: String,
    /// Whether the artifact file existed when each encode started
    pub ogg_existed_at_encode: Mutex<Vec<bool>>,
}

impl Default for FakeToolchain {
    fn default() -> Self {
        Self {
            synthesize_calls: AtomicUsize::new(0),
            trim_calls: AtomicUsize::new(0),
            encode_calls: AtomicUsize::new(0),
            inspect_calls: AtomicUsize::new(0),
            resample_calls: AtomicUsize::new(0),
            fail_stage: None,
            skip_ogg_write: false,
            report: DEFAULT_REPORT.to_string(),
            ogg_existed_at_encode: Mutex::new(Vec::new()),
        }
    }
}

impl FakeToolchain {
    pub fn failing(stage: Stage) -> Self {
        Self {
            fail_stage: Some(stage),
            ..Self::default()
        }
    }

    pub fn with_report(report: &str) -> Self {
        Self {
            report: report.to_string(),
            ..Self::default()
        }
    }

    pub fn encodes(&self) -> usize {
        self.encode_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.synthesize_calls.load(Ordering::SeqCst)
            + self.trim_calls.load(Ordering::SeqCst)
            + self.encode_calls.load(Ordering::SeqCst)
            + self.inspect_calls.load(Ordering::SeqCst)
            + self.resample_calls.load(Ordering::SeqCst)
    }

    fn check(&self, stage: Stage) -> Result<(), ToolError> {
        if self.fail_stage == Some(stage) {
            return Err(ToolError::Failed {
                command: format!("fake-{}", stage),
                status: "exit status: 1".to_string(),
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AudioToolchain for FakeToolchain {
    async fn synthesize(&self, voice: &str, text: &str, wav: &Path) -> Result<(), ToolError> {
        self.synthesize_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Stage::Synthesize)?;
        std::fs::write(wav, format!("RIFF {} {}", voice, text)).unwrap();
        Ok(())
    }

    async fn trim_and_pad(&self, wav: &Path, trimmed: &Path) -> Result<(), ToolError> {
        self.trim_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Stage::Trim)?;
        std::fs::copy(wav, trimmed).unwrap();
        Ok(())
    }

    async fn encode(&self, trimmed: &Path, ogg: &Path) -> Result<(), ToolError> {
        self.encode_calls.fetch_add(1, Ordering::SeqCst);
        self.ogg_existed_at_encode.lock().unwrap().push(ogg.exists());
        self.check(Stage::Encode)?;
        if !self.skip_ogg_write {
            let mut payload = b"OggS".to_vec();
            payload.extend(std::fs::read(trimmed).unwrap());
            std::fs::write(ogg, payload).unwrap();
        }
        Ok(())
    }

    async fn inspect(&self, _ogg: &Path) -> Result<String, ToolError> {
        self.inspect_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Stage::Inspect)?;
        Ok(self.report.clone())
    }

    async fn resample(&self, wav: &Path, target: &Path) -> Result<(), ToolError> {
        self.resample_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Stage::Resample)?;
        std::fs::copy(wav, target).unwrap();
        Ok(())
    }
}

/// Builder over a fake toolchain working in `work`
pub fn builder(work: &TempDir, common: Option<&TempDir>, fake: FakeToolchain) -> ArtifactBuilder<FakeToolchain> {
    ArtifactBuilder::new(
        fake,
        AudioDirs {
            work_dir: work.path().to_path_buf(),
            common_dir: common.map(|dir| dir.path().to_path_buf()),
        },
    )
}

pub fn write_file(path: &Path, content: &[u8]) {
    std::fs::write(path, content).unwrap();
}

/// Set a file's modification time to `secs_ago` seconds before now
pub fn set_age(path: &Path, secs_ago: u64) {
    let when = SystemTime::now() - Duration::from_secs(secs_ago);
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(when)
        .unwrap();
}

/// A prompt message with its translation
pub fn message(key: &str, text: &str) -> Message {
    Message::new(key, "prompt", 1, Translation::new("sv", key, text, Vec::new()))
}
