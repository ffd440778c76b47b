//! Error types for narrator-build
//!
//! Per-clip failures (`ArtifactError`) are collected and reported after every
//! clip was attempted. Validation failures on assembled messages abort the
//! build before anything is persisted.

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Pipeline stage that ran an external process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Synthesize,
    Trim,
    Encode,
    Inspect,
    Resample,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Synthesize => "synthesize",
            Stage::Trim => "trim",
            Stage::Encode => "encode",
            Stage::Inspect => "inspect",
            Stage::Resample => "resample",
        };
        f.write_str(name)
    }
}

/// Missing or invalid field on an assembled entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no {field} set for {entity}")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("invalid type value '{kind}' for parameter '{name}'")]
    InvalidParamKind { name: String, kind: String },

    #[error("invalid type value '{class}' for message '{key}'")]
    InvalidMessageClass { key: String, class: String },
}

/// Failure rendering one literal segment into an audio artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No waveform found and no synthesis voice supplied
    #[error("wav file {} does not exist and no synthesis voice was given", path.display())]
    MissingSource { path: PathBuf },

    /// External process failed (non-zero exit, spawn failure or timeout)
    #[error("{stage} failed for {}: {reason} (command: {command})", path.display())]
    Encode {
        stage: Stage,
        path: PathBuf,
        command: String,
        reason: String,
    },

    /// Expected artifact absent after encoding
    #[error("ogg file {} does not exist", path.display())]
    MissingOutput { path: PathBuf },

    /// Inspector report did not contain exactly one playback length
    #[error("could not find playback length for file {}: {reason}", path.display())]
    DurationParse { path: PathBuf, reason: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArtifactError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArtifactError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Build-level error
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{source} in message '{key}'")]
    Validation {
        key: String,
        #[source]
        source: ValidationError,
    },

    #[error("key or translation can contain ONLY one tag (key: \"{key}\", translation: \"{translation}\")")]
    AmbiguousTag { key: String, translation: String },

    #[error("message '{key}' has no literal text to record")]
    NoLiteralSegment { key: String },

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Common error: {0}")]
    Common(#[from] narrator_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for build operations
pub type BuildResult<T> = Result<T, BuildError>;
