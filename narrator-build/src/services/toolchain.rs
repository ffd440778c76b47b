//! External audio toolchain
//!
//! Five process-shaped capabilities back the artifact builder: speech
//! synthesis (espeak), silence trim + padding (sox), Ogg Vorbis encoding
//! (oggenc), bitstream inspection (ogginfo) and low-fidelity resampling
//! (sox). Every call is a blocking process invocation from the caller's
//! point of view; a non-zero exit fails that stage.

use async_trait::async_trait;
use narrator_common::config::ToolsConfig;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Silence padding added before the trimmed audio
pub const PAD_LEAD_MS: u32 = 10;

/// Silence padding added after the trimmed audio
pub const PAD_TRAIL_MS: u32 = 50;

/// Sample rate of resampled waveforms
pub const RESAMPLE_RATE_HZ: u32 = 8000;

/// Bit depth of resampled waveforms
pub const RESAMPLE_BITS: u32 = 8;

/// Toolchain invocation errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Binary not found in PATH
    #[error("{program} not found")]
    NotFound { program: String },

    /// Process could not be started
    #[error("failed to start: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited unsuccessfully
    #[error("exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Process exceeded the configured timeout
    #[error("timed out after {secs}s")]
    TimedOut { command: String, secs: u64 },
}

impl ToolError {
    /// Command line of the failed invocation
    pub fn command(&self) -> &str {
        match self {
            ToolError::NotFound { program } => program,
            ToolError::Spawn { command, .. }
            | ToolError::Failed { command, .. }
            | ToolError::TimedOut { command, .. } => command,
        }
    }
}

/// Audio processing capabilities used by the artifact builder
#[async_trait]
pub trait AudioToolchain: Send + Sync {
    /// Synthesize `text` with `voice` into a waveform at `wav`
    async fn synthesize(&self, voice: &str, text: &str, wav: &Path) -> Result<(), ToolError>;

    /// Trim leading/trailing silence and pad with fixed silence
    async fn trim_and_pad(&self, wav: &Path, trimmed: &Path) -> Result<(), ToolError>;

    /// Resample and compress to Ogg Vorbis
    async fn encode(&self, trimmed: &Path, ogg: &Path) -> Result<(), ToolError>;

    /// Textual bitstream report for a compressed file
    async fn inspect(&self, ogg: &Path) -> Result<String, ToolError>;

    /// Mono 8-bit/8 kHz waveform copy
    async fn resample(&self, wav: &Path, target: &Path) -> Result<(), ToolError>;
}

/// Binary that is missing from the system, with the package providing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTool {
    pub program: String,
    pub package: &'static str,
}

/// Toolchain backed by espeak, sox, oggenc and ogginfo processes
#[derive(Debug, Clone)]
pub struct ProcessToolchain {
    tools: ToolsConfig,
    resample_rate: u32,
    timeout: Duration,
}

impl ProcessToolchain {
    pub fn new(tools: ToolsConfig, resample_rate: u32) -> Self {
        let timeout = Duration::from_secs(tools.timeout_secs);
        Self {
            tools,
            resample_rate,
            timeout,
        }
    }

    /// Probe every configured binary
    ///
    /// Only a failure to start the process counts as missing; the probe's
    /// exit status is ignored.
    pub async fn verify(&self) -> Vec<MissingTool> {
        let probes: [(&str, &'static str, &str); 4] = [
            (self.tools.oggenc.as_str(), "vorbis-tools", "--version"),
            (self.tools.ogginfo.as_str(), "vorbis-tools", "--version"),
            (self.tools.espeak.as_str(), "espeak", "--version"),
            (self.tools.sox.as_str(), "sox", "--version"),
        ];

        let mut missing = Vec::new();
        for (program, package, probe) in probes {
            let spawned = Command::new(program)
                .arg(probe)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .status()
                .await;
            if let Err(e) = spawned {
                tracing::debug!(program, error = %e, "Tool probe failed");
                missing.push(MissingTool {
                    program: program.to_string(),
                    package,
                });
            }
        }
        missing
    }

    async fn run(&self, program: &str, args: Vec<OsString>) -> Result<Output, ToolError> {
        let command = command_line(program, &args);
        tracing::debug!(command = %command, "Running tool");

        let child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Err(_) => {
                return Err(ToolError::TimedOut {
                    command,
                    secs: self.timeout.as_secs(),
                })
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::NotFound {
                    program: program.to_string(),
                })
            }
            Ok(Err(source)) => return Err(ToolError::Spawn { command, source }),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(ToolError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl AudioToolchain for ProcessToolchain {
    async fn synthesize(&self, voice: &str, text: &str, wav: &Path) -> Result<(), ToolError> {
        self.run(&self.tools.espeak, synthesize_args(voice, text, wav))
            .await
            .map(|_| ())
    }

    async fn trim_and_pad(&self, wav: &Path, trimmed: &Path) -> Result<(), ToolError> {
        self.run(&self.tools.sox, trim_args(wav, trimmed))
            .await
            .map(|_| ())
    }

    async fn encode(&self, trimmed: &Path, ogg: &Path) -> Result<(), ToolError> {
        self.run(&self.tools.oggenc, encode_args(trimmed, ogg, self.resample_rate))
            .await
            .map(|_| ())
    }

    async fn inspect(&self, ogg: &Path) -> Result<String, ToolError> {
        let output = self
            .run(&self.tools.ogginfo, vec![ogg.as_os_str().to_owned()])
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn resample(&self, wav: &Path, target: &Path) -> Result<(), ToolError> {
        self.run(&self.tools.sox, resample_args(wav, target))
            .await
            .map(|_| ())
    }
}

fn os(s: impl AsRef<OsStr>) -> OsString {
    s.as_ref().to_owned()
}

/// `-v <voice> -w <wav> <text>`
pub fn synthesize_args(voice: &str, text: &str, wav: &Path) -> Vec<OsString> {
    vec![os("-v"), os(voice), os("-w"), os(wav), os(text)]
}

/// Trim silence at both ends (via reverse), then pad with fixed silence
pub fn trim_args(wav: &Path, trimmed: &Path) -> Vec<OsString> {
    let lead = format!("{:.3}", f64::from(PAD_LEAD_MS) / 1000.0);
    let trail = format!("{:.3}", f64::from(PAD_TRAIL_MS) / 1000.0);
    let mut args = vec![os("-q"), os("-t"), os("wav"), os(wav), os(trimmed)];
    for word in [
        "silence", "1", "1", "0.05%", "reverse", "silence", "1", "1", "0.05%", "reverse", "pad",
    ] {
        args.push(os(word));
    }
    args.push(os(lead));
    args.push(os(trail));
    args
}

/// `-Q --resample <rate> <trimmed> -o <ogg>`
pub fn encode_args(trimmed: &Path, ogg: &Path, rate: u32) -> Vec<OsString> {
    vec![
        os("-Q"),
        os("--resample"),
        os(rate.to_string()),
        os(trimmed),
        os("-o"),
        os(ogg),
    ]
}

/// `<wav> -r 8000 -c 1 -b 8 <target>`
pub fn resample_args(wav: &Path, target: &Path) -> Vec<OsString> {
    vec![
        os(wav),
        os("-r"),
        os(RESAMPLE_RATE_HZ.to_string()),
        os("-c"),
        os("1"),
        os("-b"),
        os(RESAMPLE_BITS.to_string()),
        os(target),
    ]
}

/// Printable command line; arguments containing spaces are double-quoted
pub fn command_line(program: &str, args: &[OsString]) -> String {
    let mut line = program.to_string();
    for arg in args {
        let arg = arg.to_string_lossy();
        line.push(' ');
        if arg.contains(' ') {
            line.push('"');
            line.push_str(&arg);
            line.push('"');
        } else {
            line.push_str(&arg);
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(program: &str, args: Vec<OsString>) -> String {
        command_line(program, &args)
    }

    #[test]
    fn test_trim_command_shape() {
        assert_eq!(
            joined("sox", trim_args(Path::new("/w/a.wav"), Path::new("/w/a.trimmed.wav"))),
            "sox -q -t wav /w/a.wav /w/a.trimmed.wav silence 1 1 0.05% reverse silence 1 1 0.05% reverse pad 0.010 0.050"
        );
    }

    #[test]
    fn test_encode_command_shape() {
        assert_eq!(
            joined("oggenc", encode_args(Path::new("/w/t.wav"), Path::new("/w/a.ogg"), 44100)),
            "oggenc -Q --resample 44100 /w/t.wav -o /w/a.ogg"
        );
    }

    #[test]
    fn test_synthesize_command_quotes_text() {
        assert_eq!(
            joined("espeak", synthesize_args("sv", "god morgon", Path::new("/w/g.wav"))),
            "espeak -v sv -w /w/g.wav \"god morgon\""
        );
    }

    #[test]
    fn test_resample_command_shape() {
        assert_eq!(
            joined("sox", resample_args(Path::new("/w/a.wav"), Path::new("/u/a.wav"))),
            "sox /w/a.wav -r 8000 -c 1 -b 8 /u/a.wav"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_reported_by_verify() {
        let tools = ToolsConfig {
            espeak: "narrator-test-no-such-espeak".to_string(),
            ..ToolsConfig::default()
        };
        let toolchain = ProcessToolchain::new(tools, 44100);
        let missing = toolchain.verify().await;
        assert!(missing.iter().any(|m| m.program == "narrator-test-no-such-espeak"
            && m.package == "espeak"));
    }

    #[tokio::test]
    async fn test_run_missing_binary_is_not_found() {
        let tools = ToolsConfig {
            ogginfo: "narrator-test-no-such-ogginfo".to_string(),
            ..ToolsConfig::default()
        };
        let toolchain = ProcessToolchain::new(tools, 44100);
        let err = toolchain.inspect(Path::new("/nonexistent.ogg")).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));
    }
}
